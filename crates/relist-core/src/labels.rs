//! Human-readable names for raw defect classes

use std::borrow::Cow;

/// Raw model class and the name shown to sellers
const FRIENDLY_LABELS: [(&str, &str); 5] = [
    ("glass_crack", "Screen crack"),
    ("scratch", "Scratch"),
    ("bent", "Bent frame"),
    ("body_damage", "Body damage"),
    ("pixel_defect", "Display defect"),
];

/// Map a raw class name to its display name; unknown classes pass through
pub fn friendly_label(raw: &str) -> Cow<'_, str> {
    FRIENDLY_LABELS
        .iter()
        .find(|(class, _)| *class == raw)
        .map(|(_, name)| Cow::Borrowed(*name))
        .unwrap_or(Cow::Borrowed(raw))
}
