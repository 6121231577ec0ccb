use serde::{Serialize, Serializer};
use std::fmt;

/// Canonical component types understood by the form renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Radio,
    Panel,
    Input,
    Text,
    Email,
    Phone,
    Password,
    PasswordInput,
    Number,
    Textarea,
    Select,
    Checkboxes,
    Date,
    DateInput,
    Label,
    Paragraph,
    InsetText,
    WarningText,
    Details,
    Accordion,
    CharacterCount,
    FileUpload,
    SummaryList,
    SignatureAck,
}

/// Authoring synonyms folded into a canonical type before the allowlist check.
pub const TYPE_ALIASES: &[(&str, ComponentType)] = &[
    ("checkbox", ComponentType::Checkboxes),
    ("radios", ComponentType::Radio),
];

/// Template keys whose type column is ignored in favour of a fixed type.
const TEMPLATE_KEY_OVERRIDES: &[(&str, ComponentType)] = &[("text-block", ComponentType::Paragraph)];

impl ComponentType {
    pub const ALL: [ComponentType; 24] = [
        ComponentType::Radio,
        ComponentType::Panel,
        ComponentType::Input,
        ComponentType::Text,
        ComponentType::Email,
        ComponentType::Phone,
        ComponentType::Password,
        ComponentType::PasswordInput,
        ComponentType::Number,
        ComponentType::Textarea,
        ComponentType::Select,
        ComponentType::Checkboxes,
        ComponentType::Date,
        ComponentType::DateInput,
        ComponentType::Label,
        ComponentType::Paragraph,
        ComponentType::InsetText,
        ComponentType::WarningText,
        ComponentType::Details,
        ComponentType::Accordion,
        ComponentType::CharacterCount,
        ComponentType::FileUpload,
        ComponentType::SummaryList,
        ComponentType::SignatureAck,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentType::Radio => "radio",
            ComponentType::Panel => "panel",
            ComponentType::Input => "input",
            ComponentType::Text => "text",
            ComponentType::Email => "email",
            ComponentType::Phone => "phone",
            ComponentType::Password => "password",
            ComponentType::PasswordInput => "password-input",
            ComponentType::Number => "number",
            ComponentType::Textarea => "textarea",
            ComponentType::Select => "select",
            ComponentType::Checkboxes => "checkboxes",
            ComponentType::Date => "date",
            ComponentType::DateInput => "date-input",
            ComponentType::Label => "label",
            ComponentType::Paragraph => "paragraph",
            ComponentType::InsetText => "inset-text",
            ComponentType::WarningText => "warning-text",
            ComponentType::Details => "details",
            ComponentType::Accordion => "accordion",
            ComponentType::CharacterCount => "character-count",
            ComponentType::FileUpload => "file-upload",
            ComponentType::SummaryList => "summary-list",
            ComponentType::SignatureAck => "signature-ack",
        }
    }

    /// Classify a raw template type. Aliases are consulted once, here.
    pub fn classify(raw: &str) -> Option<ComponentType> {
        let normalized = raw.trim().to_ascii_lowercase();
        if let Some((_, canonical)) = TYPE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
        {
            return Some(*canonical);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.as_str() == normalized)
    }

    /// Classify a template row, honouring template-key overrides first.
    pub fn classify_template(template_key: &str, raw_type: &str) -> Option<ComponentType> {
        TEMPLATE_KEY_OVERRIDES
            .iter()
            .find(|(key, _)| *key == template_key)
            .map(|(_, kind)| *kind)
            .or_else(|| Self::classify(raw_type))
    }

    /// Choice types carry an option list.
    pub fn is_choice(self) -> bool {
        matches!(
            self,
            ComponentType::Radio | ComponentType::Checkboxes | ComponentType::Select
        )
    }

    /// Choice types whose options may reveal nested components.
    pub fn reveals_children(self) -> bool {
        matches!(self, ComponentType::Radio | ComponentType::Checkboxes)
    }

    /// Purely presentational types bypass identifier and option handling.
    pub fn is_presentational(self) -> bool {
        matches!(
            self,
            ComponentType::Paragraph | ComponentType::InsetText | ComponentType::WarningText
        )
    }

    pub fn is_date(self) -> bool {
        matches!(self, ComponentType::Date | ComponentType::DateInput)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ComponentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
