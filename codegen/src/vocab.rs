//! Option vocabularies of the `block_creator` dropdowns.

/// Colour used when the category is not one of the known ones.
pub const DEFAULT_HUE: u32 = 230;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Movement,
    Sensing,
    Logic,
    Loops,
    Math,
    Text,
    Lists,
    Variables,
}

impl Category {
    pub fn from_option(option: &str) -> Option<Category> {
        match option {
            "CATEGORY_MOVEMENT" => Some(Category::Movement),
            "CATEGORY_SENSING" => Some(Category::Sensing),
            "CATEGORY_LOGIC" => Some(Category::Logic),
            "CATEGORY_LOOPS" => Some(Category::Loops),
            "CATEGORY_MATH" => Some(Category::Math),
            "CATEGORY_TEXT" => Some(Category::Text),
            "CATEGORY_LISTS" => Some(Category::Lists),
            "CATEGORY_VARIABLES" => Some(Category::Variables),
            _ => None,
        }
    }

    pub fn colour(&self) -> &'static str {
        match self {
            Category::Movement => "#D91E1E",
            Category::Sensing => "#FF811E",
            Category::Logic => "#FFA800",
            Category::Loops => "#3EBB10",
            Category::Math => "#0ACA96",
            Category::Text => "#0AB6D4",
            Category::Lists => "#0A68CA",
            Category::Variables => "#5C0ACA",
        }
    }

    /// Name shown in the category dropdown.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Movement => "Movement",
            Category::Sensing => "Sensing",
            Category::Logic => "Logic",
            Category::Loops => "Loops",
            Category::Math => "Math",
            Category::Text => "Text",
            Category::Lists => "Lists",
            Category::Variables => "Variables",
        }
    }
}

/// How the finished block lays out its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLayout {
    Auto,
    External,
    Inline,
}

impl InputLayout {
    /// Unknown options behave like `OPTION_AUTO`.
    pub fn from_option(option: &str) -> InputLayout {
        match option {
            "OPTION_EXTERNAL" => InputLayout::External,
            "OPTION_INLINE" => InputLayout::Inline,
            _ => InputLayout::Auto,
        }
    }

    /// Value of `"inputsInline"`, absent for auto.
    pub fn inputs_inline(&self) -> Option<bool> {
        match self {
            InputLayout::Auto => None,
            InputLayout::External => Some(false),
            InputLayout::Inline => Some(true),
        }
    }
}

/// Which connections the finished block has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionShape {
    None,
    /// Output on the left: the block is an expression.
    Left,
    TopBottom,
    Top,
    Bottom,
}

impl ConnectionShape {
    pub fn from_option(option: &str) -> ConnectionShape {
        match option {
            "OPTION_CONNECTIONS_LEFT" => ConnectionShape::Left,
            "OPTION_CONNECTIONS_TOP_BOTTOM" => ConnectionShape::TopBottom,
            "OPTION_CONNECTIONS_TOP" => ConnectionShape::Top,
            "OPTION_CONNECTIONS_BOTTOM" => ConnectionShape::Bottom,
            _ => ConnectionShape::None,
        }
    }

    /// Definition keys set to `null` for this shape, in document order.
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            ConnectionShape::None => &[],
            ConnectionShape::Left => &["output"],
            ConnectionShape::TopBottom => &["previousStatement", "nextStatement"],
            ConnectionShape::Top => &["previousStatement"],
            ConnectionShape::Bottom => &["nextStatement"],
        }
    }
}
