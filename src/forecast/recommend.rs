//! Advisory text derived from a condition label and an average temperature.
//!
//! Rules are checked in a fixed order and the first match wins:
//!
//! 1. Rain labels: thunderstorm text, intense-rain text, cold rain below 10°,
//!    otherwise an umbrella.
//! 2. Snow labels: extreme cold gear below -5°, otherwise general snow gear.
//! 3. Temperature bands, whatever the condition: above 25° (sunscreen when
//!    clear, light clothing otherwise), above 15°, below 4°, below 8°.
//!    Exactly 4° lands in the "below 8°" band; exactly 8°, 15° and 25° fall
//!    through to the band below them or to step 4.
//! 4. Condition keywords: clear sky (colder variant below 13°), wind, fog or
//!    mist, clouds (light layer above 15°).
//! 5. A generic message.
//!
//! Without a temperature, every temperature comparison is skipped.

/// Thunderstorm inside a rain label
pub const STORM_SHELTER: &str = "⚡Evita áreas abiertas y busca refugio";
/// Intense rain
pub const RAIN_GEAR: &str = "🌧️Usa impermeable y botas de agua";
/// Rain below 10°
pub const COLD_RAIN: &str = "❄️Abrigo impermeable";
/// Any other rain
pub const UMBRELLA: &str = "☔Lleva paraguas";
/// Snow below -5°
pub const EXTREME_COLD_GEAR: &str = "🧊Ropa térmica completa y calzado antideslizante";
/// Any other snow
pub const SNOW_GEAR: &str = "⛄Abrigo grueso, guantes y gorro térmico";
/// Clear sky above 25°
pub const SUNSCREEN_HIGH: &str = "🔥Protector solar FPS 50+";
/// Any other condition above 25°
pub const LIGHT_CLOTHING: &str = "🥵Ropa ligera e hidrátate";
/// Above 15°
pub const SUN_PROTECTION: &str = "☀️Gafas y protector solar";
/// Below 4°
pub const HEAVY_COAT: &str = "🧤Abrigo y bufanda";
/// Below 8°
pub const THICK_JACKET: &str = "🧣Chaqueta gruesa";
/// Clear sky below 13°
pub const BUNDLE_UP: &str = "🧤Abrigate";
/// Clear sky otherwise
pub const SUNGLASSES: &str = "😎Gafas y protector solar";
/// Windy conditions
pub const WINDBREAKER: &str = "🍃Chaqueta cortavientos";
/// Fog or mist
pub const DRIVE_CAREFULLY: &str = "🌫️Conduce con precaución";
/// Clouds above 15°
pub const LIGHT_LAYER: &str = "⛅Capa ligera";
/// Clouds otherwise
pub const JACKET: &str = "☁️Lleva una chaqueta";
/// Nothing else applies
pub const ENJOY: &str = "✨Disfruta de las condiciones";

/// Produces the advisory for a translated condition label and average temperature.
pub fn recommend(condition: &str, avg_temp: Option<f64>) -> &'static str {
    let condition = condition.to_lowercase();
    let below = |limit: f64| avg_temp.is_some_and(|t| t < limit);
    let above = |limit: f64| avg_temp.is_some_and(|t| t > limit);

    if condition.contains("lluvia") {
        if condition.contains("tormenta") {
            return STORM_SHELTER;
        }
        if condition.contains("lluvia intensa") {
            return RAIN_GEAR;
        }
        if below(10.0) {
            return COLD_RAIN;
        }
        return UMBRELLA;
    }

    if condition.contains("nieve") || condition.contains("nevadas") {
        if below(-5.0) {
            return EXTREME_COLD_GEAR;
        }
        return SNOW_GEAR;
    }

    if above(25.0) {
        if condition.contains("despejado") {
            return SUNSCREEN_HIGH;
        }
        return LIGHT_CLOTHING;
    }
    if above(15.0) {
        return SUN_PROTECTION;
    }
    if below(4.0) {
        return HEAVY_COAT;
    }
    if below(8.0) {
        return THICK_JACKET;
    }

    if condition.contains("despejado") {
        if below(13.0) {
            return BUNDLE_UP;
        }
        return SUNGLASSES;
    }

    if condition.contains("viento") {
        return WINDBREAKER;
    }

    if condition.contains("niebla") || condition.contains("neblina") {
        return DRIVE_CAREFULLY;
    }

    if condition.contains("nublado") || condition.contains("nubes") {
        if above(15.0) {
            return LIGHT_LAYER;
        }
        return JACKET;
    }

    ENJOY
}
