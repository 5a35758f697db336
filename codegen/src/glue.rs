//! Glue-code generator: the interpreter registration stub and the body
//! that reads the block's fields into a call expression.

use blockdef::node::{field, slot};
use blockdef::{CompositionTree, NodeId, NodeKind};

use crate::error::GenerationDiagnostic;
use crate::generator::{CodeGenerator, Context, chain};
use crate::template::sanitize;
use crate::vocab::ConnectionShape;

/// A variable the body declares, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredVariable {
    /// Sanitized field or input name, as the wrapper parameter.
    pub parameter: String,
    /// Local the body assigns, e.g. `number_speed`.
    pub local: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Glue {
    /// Sanitized block name with its case kept.
    pub name: String,
    pub declaration: String,
    pub body: String,
    pub declared: Vec<DeclaredVariable>,
}

pub struct GlueGenerator<'t> {
    ctx: Context<'t>,
    declared: Vec<DeclaredVariable>,
    name: String,
}

impl<'t> GlueGenerator<'t> {
    pub fn new(tree: &'t dyn CompositionTree) -> Self {
        GlueGenerator {
            ctx: Context::new(tree),
            declared: Vec::new(),
            name: String::new(),
        }
    }

    pub fn generate(mut self, root: NodeId) -> (Glue, Vec<GenerationDiagnostic>) {
        let body = self.block_to_code(root, true);
        let declaration = declaration(&self.name, &self.declared);
        let glue = Glue {
            name: self.name,
            declaration,
            body,
            declared: self.declared,
        };
        (glue, self.ctx.into_diagnostics())
    }

    fn block_creator(&mut self, node: NodeId) -> String {
        let tree = self.tree();
        let name = sanitize(&self.ctx.text(node, field::BLOCK_NAME));

        let mut code = String::new();
        for item in chain(tree, node, slot::INPUTS) {
            code.push_str(&self.block_to_code(item, true));
            code.push_str(&self.statement_to_code(item, slot::FIELDS));
        }

        let args = self
            .declared
            .iter()
            .map(|v| format!("\" ' + {} + ' \"", v.local))
            .collect::<Vec<_>>()
            .join(",");
        code.push_str(&format!("var code = '{}({})", name, args));

        let shape = ConnectionShape::from_option(&self.ctx.text(node, field::DROPDOWN_CONNECTIONS));
        if shape == ConnectionShape::Left {
            code.push_str("';\nreturn [code, Blockly.JavaScript.ORDER_NONE];\n");
        } else {
            code.push_str(";\\n';\nreturn code;");
        }

        tracing::debug!(block = %name, variables = self.declared.len(), "generated glue");
        self.name = name;
        code
    }

    /// Record a variable and return its declaration.
    fn declare(&mut self, node: NodeId, prefix: &str, name_key: &str, accessor: &str) -> String {
        let parameter = sanitize(&self.ctx.text(node, name_key));
        let local = format!("{}_{}", prefix, parameter.to_lowercase());
        let statement = format!(
            "var {} = {};\n",
            local,
            accessor.replace("{}", &parameter)
        );
        self.declared.push(DeclaredVariable { parameter, local });
        statement
    }
}

impl<'t> CodeGenerator<'t> for GlueGenerator<'t> {
    fn tree(&self) -> &'t dyn CompositionTree {
        self.ctx.tree
    }

    fn node_to_code(&mut self, node: NodeId, kind: NodeKind) -> Option<String> {
        const FIELD_VALUE: &str = "block.getFieldValue('{}')";

        let code = match kind {
            NodeKind::BlockCreator => self.block_creator(node),

            NodeKind::InputValue => self.declare(
                node,
                "value",
                field::INPUTNAME,
                "Blockly.JavaScript.valueToCode(block, '{}', Blockly.JavaScript.ORDER_ATOMIC)",
            ),
            NodeKind::InputStatement => self.declare(
                node,
                "statements",
                field::INPUTNAME,
                "Blockly.JavaScript.statementToCode(block, '{}')",
            ),

            NodeKind::TextInput => self.declare(node, "text", field::FIELDNAME, FIELD_VALUE),
            NodeKind::NumericInput => self.declare(node, "number", field::FIELDNAME, FIELD_VALUE),
            NodeKind::AngleInput => self.declare(node, "angle", field::FIELDNAME, FIELD_VALUE),
            NodeKind::FieldDropdown => self.declare(node, "dropdown", field::FIELDNAME, FIELD_VALUE),
            NodeKind::FieldColour => self.declare(node, "colour", field::FIELDNAME, FIELD_VALUE),
            NodeKind::FieldCheckbox => self.declare(
                node,
                "checkbox",
                field::FIELDNAME,
                "block.getFieldValue('{}') === 'TRUE'",
            ),
            NodeKind::FieldVariable => self.declare(
                node,
                "variable",
                field::FIELDNAME,
                "Blockly.JavaScript.nameDB_.getName(block.getFieldValue('{}'), Blockly.Variables.NAME_TYPE)",
            ),

            // Layout only.
            NodeKind::DummyInput | NodeKind::TextLabel | NodeKind::FieldImage => String::new(),

            NodeKind::TypeGroup
            | NodeKind::TypeNull
            | NodeKind::TypeBoolean
            | NodeKind::TypeNumber
            | NodeKind::TypeString
            | NodeKind::TypeList
            | NodeKind::TypeOther => String::new(),
        };
        Some(code)
    }

    fn scrub(&mut self, code: String, next: NodeId) -> String {
        code + &self.block_to_code(next, false)
    }
}

/// The registration stub. Parameters follow the body's declaration order so
/// they line up with the call arguments.
fn declaration(name: &str, declared: &[DeclaredVariable]) -> String {
    let mut params = declared
        .iter()
        .map(|v| v.parameter.as_str())
        .collect::<Vec<_>>()
        .join(",");
    if !params.is_empty() {
        params.push(',');
    }
    format!(
        "\nfunction init{name}(interpreter, globalObject)\n\
         {{\n\
         \x20 var wrapper = async function({params}callback)\n\
         \x20 {{}};\n\
         \n\
         \x20 Blockly.JavaScript.addReservedWords('{name}');\n\
         \x20 interpreter.setProperty(globalObject, '{name}', interpreter.createAsyncFunction(wrapper));\n\
         }}\n\
         \n\
         init{name}(interpreter, globalObject);\n\
         \n"
    )
}
