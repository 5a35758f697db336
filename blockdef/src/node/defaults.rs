use super::field::*;
use super::{FieldValue, NodeKind};

const DEFAULT_IMAGE: &str = "https://www.gstatic.com/codesite/ph/images/star_on.gif";

pub(super) fn fields_for(kind: NodeKind) -> Vec<(&'static str, FieldValue)> {
    let text = |s: &str| FieldValue::Text(s.to_string());
    let number = FieldValue::Number;

    match kind {
        NodeKind::BlockCreator => vec![
            (BLOCK_NAME, text("block_type")),
            (BLOCK_CATEGORY, text("CATEGORY_MOVEMENT")),
            (DROPDOWN_INPUT, text("OPTION_AUTO")),
            (DROPDOWN_CONNECTIONS, text("OPTION_CONNECTIONS_NONE")),
            (FIELD_TOOLTIP, text("")),
            (FIELD_HELP, text("")),
            (FIELD_DESCRIPTION, text("")),
        ],
        NodeKind::DummyInput => vec![(ALIGN, text("LEFT"))],
        NodeKind::InputValue | NodeKind::InputStatement => {
            vec![(INPUTNAME, text("NAME")), (ALIGN, text("LEFT"))]
        }
        NodeKind::TextInput => vec![(FIELDNAME, text("NAME")), (TEXT, text("default"))],
        NodeKind::TextLabel => vec![(FIELDNAME, text("")), (TEXT, text("text"))],
        NodeKind::NumericInput => vec![
            (FIELDNAME, text("NAME")),
            (VALUE, number(0.0)),
            (MIN, number(f64::NEG_INFINITY)),
            (MAX, number(f64::INFINITY)),
            (PRECISION, number(0.0)),
        ],
        NodeKind::AngleInput => vec![(FIELDNAME, text("NAME")), (ANGLE, number(90.0))],
        NodeKind::FieldDropdown => vec![(FIELDNAME, text("NAME"))],
        NodeKind::FieldCheckbox => vec![(FIELDNAME, text("NAME")), (CHECKED, text("TRUE"))],
        NodeKind::FieldColour => vec![(FIELDNAME, text("NAME")), (COLOUR, text("#ff0000"))],
        NodeKind::FieldVariable => vec![(FIELDNAME, text("NAME")), (TEXT, text("item"))],
        NodeKind::FieldImage => vec![
            (SRC, text(DEFAULT_IMAGE)),
            (WIDTH, number(15.0)),
            (HEIGHT, number(15.0)),
            (ALT, text("*")),
            (FLIP_RTL, text("FALSE")),
        ],
        NodeKind::TypeOther => vec![(TYPE, text(""))],
        NodeKind::TypeGroup
        | NodeKind::TypeNull
        | NodeKind::TypeBoolean
        | NodeKind::TypeNumber
        | NodeKind::TypeString
        | NodeKind::TypeList => Vec::new(),
    }
}
