mod defaults;
pub mod value;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use value::FieldValue;

/// Field keys read by the generators.
pub mod field {
    pub const BLOCK_NAME: &str = "BLOCK_NAME";
    pub const BLOCK_CATEGORY: &str = "BLOCK_CATEGORY";
    pub const DROPDOWN_INPUT: &str = "DROPDOWN_INPUT";
    pub const DROPDOWN_CONNECTIONS: &str = "DROPDOWN_CONNECTIONS";
    pub const FIELD_TOOLTIP: &str = "FIELD_TOOLTIP";
    pub const FIELD_HELP: &str = "FIELD_HELP";
    pub const FIELD_DESCRIPTION: &str = "FIELD_DESCRIPTION";

    pub const FIELDNAME: &str = "FIELDNAME";
    pub const INPUTNAME: &str = "INPUTNAME";
    pub const ALIGN: &str = "ALIGN";
    pub const TEXT: &str = "TEXT";
    pub const VALUE: &str = "VALUE";
    pub const MIN: &str = "MIN";
    pub const MAX: &str = "MAX";
    pub const PRECISION: &str = "PRECISION";
    pub const ANGLE: &str = "ANGLE";
    pub const CHECKED: &str = "CHECKED";
    pub const COLOUR: &str = "COLOUR";
    pub const SRC: &str = "SRC";
    pub const WIDTH: &str = "WIDTH";
    pub const HEIGHT: &str = "HEIGHT";
    pub const ALT: &str = "ALT";
    pub const FLIP_RTL: &str = "FLIP_RTL";
    pub const TYPE: &str = "TYPE";

    /// Per-option dropdown keys carry the option index as a suffix: `USER0`, `CPU0`, ...
    pub const OPTION_TEXT: &str = "USER";
    pub const OPTION_VALUE: &str = "CPU";

    pub fn indexed(key: &str, index: usize) -> String {
        format!("{}{}", key, index)
    }
}

/// Named child slots.
pub mod slot {
    /// Statement slot on `block_creator` holding the chain of inputs.
    pub const INPUTS: &str = "INPUTS";
    /// Statement slot on inputs holding the chain of attached fields.
    pub const FIELDS: &str = "FIELDS";
    /// Value slot on inputs holding the type constraint.
    pub const TYPE: &str = "TYPE";

    /// `TYPE0`, `TYPE1`, ... on a type group.
    pub fn type_n(index: usize) -> String {
        format!("{}{}", TYPE, index)
    }

    /// `TYPE` and `TYPEn` hold a single type constraint each.
    pub fn is_type_slot(name: &str) -> bool {
        name.strip_prefix(TYPE)
            .is_some_and(|index| index.chars().all(|c| c.is_ascii_digit()))
    }

    /// What a slot may hold, for error messages.
    pub fn contents(name: &str) -> &'static str {
        match name {
            INPUTS => "inputs and fields",
            FIELDS => "fields",
            name if is_type_slot(name) => "a type constraint",
            _ => "nothing",
        }
    }
}

/// Stable index of a node inside a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The fixed vocabulary of node types a composition is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Root of a composition. Describes the block being authored.
    BlockCreator,

    // Inputs
    DummyInput,
    InputValue,
    InputStatement,

    // Fields
    TextInput,
    TextLabel,
    NumericInput,
    AngleInput,
    FieldDropdown,
    FieldCheckbox,
    FieldColour,
    FieldVariable,
    FieldImage,

    // Type constraints
    TypeGroup,
    TypeNull,
    TypeBoolean,
    TypeNumber,
    TypeString,
    TypeList,
    TypeOther,
}

impl NodeKind {
    /// The type tag used in composition files.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::BlockCreator => "block_creator",
            NodeKind::DummyInput => "dummy_input",
            NodeKind::InputValue => "input_value",
            NodeKind::InputStatement => "input_statement",
            NodeKind::TextInput => "text_input",
            NodeKind::TextLabel => "text_label",
            NodeKind::NumericInput => "numeric_input",
            NodeKind::AngleInput => "angle_input",
            NodeKind::FieldDropdown => "field_dropdown",
            NodeKind::FieldCheckbox => "field_checkbox",
            NodeKind::FieldColour => "field_colour",
            NodeKind::FieldVariable => "field_variable",
            NodeKind::FieldImage => "field_image",
            NodeKind::TypeGroup => "type_group",
            NodeKind::TypeNull => "type_null",
            NodeKind::TypeBoolean => "type_boolean",
            NodeKind::TypeNumber => "type_number",
            NodeKind::TypeString => "type_string",
            NodeKind::TypeList => "type_list",
            NodeKind::TypeOther => "type_other",
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(
            self,
            NodeKind::DummyInput | NodeKind::InputValue | NodeKind::InputStatement
        )
    }

    pub fn is_field(&self) -> bool {
        matches!(
            self,
            NodeKind::TextInput
                | NodeKind::TextLabel
                | NodeKind::NumericInput
                | NodeKind::AngleInput
                | NodeKind::FieldDropdown
                | NodeKind::FieldCheckbox
                | NodeKind::FieldColour
                | NodeKind::FieldVariable
                | NodeKind::FieldImage
        )
    }

    pub fn is_type_constraint(&self) -> bool {
        matches!(
            self,
            NodeKind::TypeGroup
                | NodeKind::TypeNull
                | NodeKind::TypeBoolean
                | NodeKind::TypeNumber
                | NodeKind::TypeString
                | NodeKind::TypeList
                | NodeKind::TypeOther
        )
    }

    /// Slots every node of this kind is created with.
    /// Type groups additionally get `TYPE0..TYPEn` from their mutation.
    pub fn slot_names(&self) -> &'static [&'static str] {
        match self {
            NodeKind::BlockCreator => &[slot::INPUTS],
            NodeKind::DummyInput => &[slot::FIELDS],
            NodeKind::InputValue | NodeKind::InputStatement => &[slot::FIELDS, slot::TYPE],
            _ => &[],
        }
    }

    /// Whether a node of this kind may sit in a slot named `slot_name`.
    /// `block_creator` never fits anywhere.
    pub fn fits(&self, slot_name: &str) -> bool {
        match slot_name {
            slot::INPUTS => self.is_input() || self.is_field(),
            slot::FIELDS => self.is_field(),
            name if slot::is_type_slot(name) => self.is_type_constraint(),
            _ => false,
        }
    }

    /// Default field values, as a freshly dropped node carries them.
    pub fn default_fields(&self) -> Vec<(&'static str, FieldValue)> {
        defaults::fields_for(*self)
    }

    pub fn default_field(&self, key: &str) -> Option<FieldValue> {
        self.default_fields()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Kind of a single dropdown option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Text,
    Image,
}

/// Editor-side node state that is not a field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Ordered option kinds of a dropdown.
    Dropdown(Vec<OptionKind>),
    /// Number of `TYPEn` slots on a type group.
    TypeGroup { count: usize },
}
