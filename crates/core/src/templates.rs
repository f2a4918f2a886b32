//! Campaign message rendering.

use crate::types::Recipient;

/// Token replaced with the recipient's display name.
pub const NAME_PLACEHOLDER: &str = "{{name}}";

/// Replace every `{{name}}` in `template` with the recipient's name, or with
/// nothing when the recipient has no name.
pub fn render(template: &str, recipient: &Recipient) -> String {
    let name = recipient.display_name.as_deref().unwrap_or_default();
    template.replace(NAME_PLACEHOLDER, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> Recipient {
        Recipient::new("5511999990000", Some("Ana".to_string()))
    }

    #[test]
    fn test_render_substitutes_name() {
        assert_eq!(render("Hello {{name}}!", &ana()), "Hello Ana!");
    }

    #[test]
    fn test_render_without_name_leaves_gap() {
        let nameless = Recipient::new("5511999990000", None);
        assert_eq!(render("Hello {{name}}!", &nameless), "Hello !");
    }

    #[test]
    fn test_render_replaces_every_occurrence() {
        assert_eq!(render("{{name}}, {{name}}!", &ana()), "Ana, Ana!");
    }

    #[test]
    fn test_render_without_placeholder_is_identity() {
        let template = "Sale ends tonight. {name} {{ name }}";
        assert_eq!(render(template, &ana()), template);
    }
}
