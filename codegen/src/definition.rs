//! Block-definition document generator.
//!
//! Every producer renders one JSON value; the `block_creator` producer
//! assembles the whole document around the fragments of its inputs.

use blockdef::node::{field, slot};
use blockdef::{CompositionTree, Mutation, NodeId, NodeKind, OptionKind};

use crate::error::{GenerationDiagnostic, GenerationError};
use crate::generator::{CodeGenerator, Context, chain};
use crate::template::{array, number, object, placeholders, quote, sanitize};
use crate::vocab::{Category, ConnectionShape, DEFAULT_HUE, InputLayout};

/// The definition document of one block.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub document: String,
    /// Sanitized, lower-cased block name: the document's `"type"`.
    pub block_type: String,
}

pub struct DefinitionGenerator<'t> {
    ctx: Context<'t>,
    block_type: String,
}

type Entries = Vec<(&'static str, String)>;

impl<'t> DefinitionGenerator<'t> {
    pub fn new(tree: &'t dyn CompositionTree) -> Self {
        DefinitionGenerator {
            ctx: Context::new(tree),
            block_type: String::new(),
        }
    }

    /// Generate the document for `root`, a `block_creator` node.
    pub fn generate(mut self, root: NodeId) -> (Definition, Vec<GenerationDiagnostic>) {
        let document = self.block_to_code(root, true);
        let definition = Definition {
            document,
            block_type: self.block_type,
        };
        (definition, self.ctx.into_diagnostics())
    }

    fn block_creator(&mut self, node: NodeId) -> String {
        let tree = self.tree();
        let name = sanitize(&self.ctx.text(node, field::BLOCK_NAME).to_lowercase());

        let mut args = Vec::new();
        let mut elided = 0;
        for item in chain(tree, node, slot::INPUTS) {
            // Fields precede the input they belong to.
            let nested = self.statement_to_code(item, slot::FIELDS);
            if !nested.is_empty() {
                args.push(nested);
            }

            let trailing_dummy = tree.kind(item) == Some(NodeKind::DummyInput)
                && tree.next_sibling(item).is_none();
            if trailing_dummy {
                elided += 1;
                continue;
            }
            let code = self.block_to_code(item, true);
            if !code.is_empty() {
                args.push(code);
            }
        }

        let constraints = tree
            .descendants(node)
            .into_iter()
            .filter(|&id| tree.kind(id).is_some_and(|k| k.is_type_constraint()))
            .count();
        let args_count = tree
            .descendant_count(node)
            .saturating_sub(1 + constraints + elided);

        let mut entries: Entries = vec![("type", quote(&name))];
        if args_count > 0 {
            entries.push(("message0", quote(&placeholders(args_count))));
        } else {
            self.ctx.warn(GenerationError::NoLiveFields, Some(node));
        }
        if !args.is_empty() {
            entries.push(("args0", array(&args)));
        }

        let layout = InputLayout::from_option(&self.ctx.text(node, field::DROPDOWN_INPUT));
        if let Some(inline) = layout.inputs_inline() {
            entries.push(("inputsInline", inline.to_string()));
        }
        let shape = ConnectionShape::from_option(&self.ctx.text(node, field::DROPDOWN_CONNECTIONS));
        for &key in shape.keys() {
            entries.push((key, "null".to_string()));
        }

        let colour = match Category::from_option(&self.ctx.text(node, field::BLOCK_CATEGORY)) {
            Some(category) => quote(category.colour()),
            None => DEFAULT_HUE.to_string(),
        };
        entries.push(("colour", colour));
        entries.push(("tooltip", quote(&self.ctx.text(node, field::FIELD_TOOLTIP))));
        entries.push(("helpUrl", quote(&self.ctx.text(node, field::FIELD_HELP))));

        tracing::debug!(block = %name, args = args_count, constraints, elided, "generated definition");
        self.block_type = name;
        object(&entries)
    }

    fn name(&self, node: NodeId, key: &str) -> String {
        quote(&sanitize(&self.ctx.text(node, key)))
    }

    fn push_align(&self, node: NodeId, entries: &mut Entries) {
        let align = self.ctx.text(node, field::ALIGN);
        if !align.is_empty() && align != "LEFT" {
            entries.push(("align", quote(&align)));
        }
    }

    fn dummy_input(&mut self, node: NodeId) -> String {
        let mut entries: Entries = vec![("type", quote("input_dummy"))];
        self.push_align(node, &mut entries);
        object(&entries)
    }

    fn input(&mut self, node: NodeId, json_type: &str) -> String {
        let mut entries: Entries = vec![
            ("type", quote(json_type)),
            ("name", self.name(node, field::INPUTNAME)),
        ];
        self.push_align(node, &mut entries);
        if let Some(check) = self.type_check(node) {
            entries.push(("check", check));
        }
        object(&entries)
    }

    /// Whatever the node in the `TYPE` slot renders to; `None` means any type.
    fn type_check(&mut self, node: NodeId) -> Option<String> {
        let tree = self.tree();
        if !tree.has_slot(node, slot::TYPE) {
            self.ctx.warn(
                GenerationError::MissingRequiredSlot {
                    node,
                    slot: slot::TYPE.to_string(),
                },
                Some(node),
            );
            return None;
        }
        let target = tree.slot_target(node, slot::TYPE)?;
        let check = self.block_to_code(target, true);
        (!check.is_empty()).then_some(check)
    }

    fn text_field(&mut self, node: NodeId, json_type: &str) -> String {
        object(&[
            ("type", quote(json_type)),
            ("name", self.name(node, field::FIELDNAME)),
            ("text", quote(&self.ctx.text(node, field::TEXT))),
        ])
    }

    fn numeric_input(&mut self, node: NodeId) -> String {
        let mut entries: Entries = vec![
            ("type", quote("field_number")),
            ("name", self.name(node, field::FIELDNAME)),
            ("value", number(self.ctx.number(node, field::VALUE))),
        ];
        let min = self.ctx.number(node, field::MIN);
        if min.is_finite() {
            entries.push(("min", number(min)));
        }
        let max = self.ctx.number(node, field::MAX);
        if max.is_finite() {
            entries.push(("max", number(max)));
        }
        let precision = self.ctx.number(node, field::PRECISION);
        if precision != 0.0 && precision.is_finite() {
            entries.push(("precision", number(precision)));
        }
        object(&entries)
    }

    fn angle_input(&mut self, node: NodeId) -> String {
        object(&[
            ("type", quote("field_angle")),
            ("name", self.name(node, field::FIELDNAME)),
            ("angle", number(self.ctx.number(node, field::ANGLE))),
        ])
    }

    fn field_dropdown(&mut self, node: NodeId) -> String {
        let kinds = match self.tree().mutation(node) {
            Some(Mutation::Dropdown(kinds)) => kinds.clone(),
            _ => Vec::new(),
        };

        let mut options = Vec::with_capacity(kinds.len());
        for (i, kind) in kinds.iter().enumerate() {
            let key = |k: &str| field::indexed(k, i);
            let display = match kind {
                OptionKind::Text => quote(&self.ctx.text(node, &key(field::OPTION_TEXT))),
                OptionKind::Image => object(&[
                    ("src", quote(&self.ctx.text(node, &key(field::SRC)))),
                    ("width", number(self.ctx.number(node, &key(field::WIDTH)))),
                    ("height", number(self.ctx.number(node, &key(field::HEIGHT)))),
                    ("alt", quote(&self.ctx.text(node, &key(field::ALT)))),
                ]),
            };
            let value = quote(&self.ctx.text(node, &key(field::OPTION_VALUE)));
            options.push(array(&[display, value]));
        }

        object(&[
            ("type", quote("field_dropdown")),
            ("name", self.name(node, field::FIELDNAME)),
            ("options", array(&options)),
        ])
    }

    fn field_checkbox(&mut self, node: NodeId) -> String {
        object(&[
            ("type", quote("field_checkbox")),
            ("name", self.name(node, field::FIELDNAME)),
            ("checked", self.ctx.boolean(node, field::CHECKED).to_string()),
        ])
    }

    fn field_colour(&mut self, node: NodeId) -> String {
        object(&[
            ("type", quote("field_colour")),
            ("name", self.name(node, field::FIELDNAME)),
            ("colour", quote(&self.ctx.text(node, field::COLOUR))),
        ])
    }

    fn field_variable(&mut self, node: NodeId) -> String {
        object(&[
            ("type", quote("field_variable")),
            ("name", self.name(node, field::FIELDNAME)),
            ("variable", quote(&self.ctx.text(node, field::TEXT))),
        ])
    }

    fn field_image(&mut self, node: NodeId) -> String {
        object(&[
            ("type", quote("field_image")),
            ("src", quote(&self.ctx.text(node, field::SRC))),
            ("width", number(self.ctx.number(node, field::WIDTH))),
            ("height", number(self.ctx.number(node, field::HEIGHT))),
            ("alt", quote(&self.ctx.text(node, field::ALT))),
            ("flipRtl", self.ctx.boolean(node, field::FLIP_RTL).to_string()),
        ])
    }

    fn type_group(&mut self, node: NodeId) -> String {
        let tree = self.tree();
        let count = match tree.mutation(node) {
            Some(Mutation::TypeGroup { count }) => *count,
            _ => (0..)
                .take_while(|&i| tree.has_slot(node, &slot::type_n(i)))
                .count(),
        };

        let mut types = Vec::new();
        for i in 0..count {
            if let Some(target) = tree.slot_target(node, &slot::type_n(i)) {
                let code = self.block_to_code(target, true);
                if !code.is_empty() {
                    types.push(code);
                }
            }
        }

        if types.is_empty() {
            String::new()
        } else {
            format!("[{}]", types.join(", "))
        }
    }

    fn type_other(&mut self, node: NodeId) -> String {
        let custom = self.ctx.text(node, field::TYPE);
        if custom.is_empty() {
            String::new()
        } else {
            quote(&custom)
        }
    }
}

impl<'t> CodeGenerator<'t> for DefinitionGenerator<'t> {
    fn tree(&self) -> &'t dyn CompositionTree {
        self.ctx.tree
    }

    fn node_to_code(&mut self, node: NodeId, kind: NodeKind) -> Option<String> {
        let code = match kind {
            NodeKind::BlockCreator => self.block_creator(node),

            NodeKind::DummyInput => self.dummy_input(node),
            NodeKind::InputValue => self.input(node, "input_value"),
            NodeKind::InputStatement => self.input(node, "input_statement"),

            NodeKind::TextInput => self.text_field(node, "field_input"),
            NodeKind::TextLabel => self.text_field(node, "field_label"),
            NodeKind::NumericInput => self.numeric_input(node),
            NodeKind::AngleInput => self.angle_input(node),
            NodeKind::FieldDropdown => self.field_dropdown(node),
            NodeKind::FieldCheckbox => self.field_checkbox(node),
            NodeKind::FieldColour => self.field_colour(node),
            NodeKind::FieldVariable => self.field_variable(node),
            NodeKind::FieldImage => self.field_image(node),

            NodeKind::TypeGroup => self.type_group(node),
            NodeKind::TypeNull => String::new(),
            NodeKind::TypeBoolean => quote("Boolean"),
            NodeKind::TypeNumber => quote("Number"),
            NodeKind::TypeString => quote("String"),
            NodeKind::TypeList => quote("Array"),
            NodeKind::TypeOther => self.type_other(node),
        };
        Some(code)
    }

    fn scrub(&mut self, code: String, next: NodeId) -> String {
        let rest = self.block_to_code(next, false);
        if rest.is_empty() {
            code
        } else {
            format!("{},\n{}", code, rest)
        }
    }
}
