use blockdef::loader::Loader;
use blockdef::node::slot;
use blockdef::{Composition, CompositionTree, FieldValue, Mutation, NodeId, NodeKind};
use codegen::{GeneratedArtifact, GenerationDiagnostic, GenerationError, generate};
use serde_json::{Value, json};

fn load(source: &str) -> Composition {
    Loader::new(source.to_string(), 0)
        .load()
        .expect("load failed")
}

fn run(source: &str) -> (GeneratedArtifact, Vec<GenerationDiagnostic>) {
    generate(&load(source)).expect("generation failed")
}

fn document(artifact: &GeneratedArtifact) -> Value {
    serde_json::from_str(&artifact.definition).expect("definition is not JSON")
}

fn creator(fields: &str, inputs: &str) -> String {
    format!(
        "[[block]]\ntype = \"block_creator\"\nfields = {{ {} }}\n{}",
        fields, inputs
    )
}

const GO_FORWARD: &str = r#"
[[block]]
type = "block_creator"
fields = { BLOCK_NAME = "go forward", BLOCK_CATEGORY = "CATEGORY_MOVEMENT" }

[[block.slots.INPUTS]]
type = "dummy_input"

[[block.slots.INPUTS.slots.FIELDS]]
type = "numeric_input"
fields = { FIELDNAME = "Speed", VALUE = 5 }
"#;

#[test]
fn go_forward_end_to_end() {
    let (artifact, warnings) = run(GO_FORWARD);
    assert!(warnings.is_empty(), "{:?}", warnings);
    assert_eq!(artifact.block_type, "go_forward");
    assert_eq!(
        artifact.definition,
        r##"{
  "type": "go_forward",
  "message0": "%1",
  "args0": [
    {
      "type": "field_number",
      "name": "Speed",
      "value": 5
    }
  ],
  "colour": "#D91E1E",
  "tooltip": "",
  "helpUrl": ""
}"##
    );
    assert_eq!(
        artifact.glue_body,
        r#"var number_speed = block.getFieldValue('Speed');
var code = 'go_forward(" ' + number_speed + ' ");\n';
return code;"#
    );
    assert!(artifact
        .glue_declaration
        .contains("var wrapper = async function(Speed,callback)"));
    assert!(artifact
        .glue_declaration
        .contains("interpreter.setProperty(globalObject, 'go_forward', interpreter.createAsyncFunction(wrapper));"));
}

#[test]
fn field_directly_in_inputs_end_to_end() {
    let source = r#"
[[block]]
type = "block_creator"
fields = { BLOCK_NAME = "go forward", BLOCK_CATEGORY = "CATEGORY_MOVEMENT" }

[[block.slots.INPUTS]]
type = "numeric_input"
fields = { FIELDNAME = "Speed", VALUE = 5 }
"#;
    let (artifact, warnings) = run(source);
    assert!(warnings.is_empty(), "{:?}", warnings);
    assert_eq!(
        artifact.definition,
        r##"{
  "type": "go_forward",
  "message0": "%1",
  "args0": [
    {
      "type": "field_number",
      "name": "Speed",
      "value": 5
    }
  ],
  "colour": "#D91E1E",
  "tooltip": "",
  "helpUrl": ""
}"##
    );
    assert_eq!(
        artifact.glue_body,
        r#"var number_speed = block.getFieldValue('Speed');
var code = 'go_forward(" ' + number_speed + ' ");\n';
return code;"#
    );
}

#[test]
fn combined_glue_splits_back() {
    let (artifact, _) = run(GO_FORWARD);
    let glue = artifact.glue();
    assert_eq!(glue.matches(codegen::DELIMITER).count(), 1);
    let (declaration, body) = codegen::split_glue(&glue);
    assert_eq!(declaration, artifact.glue_declaration);
    assert_eq!(body, artifact.glue_body);
}

#[test]
fn regeneration_is_byte_identical() {
    let comp = load(GO_FORWARD);
    let (first, _) = generate(&comp).unwrap();
    let (second, _) = generate(&comp).unwrap();
    assert_eq!(first, second);
}

#[test]
fn trailing_dummy_is_elided() {
    let source = creator(
        "BLOCK_NAME = \"say\"",
        r#"
[[block.slots.INPUTS]]
type = "text_input"
fields = { FIELDNAME = "MSG", TEXT = "hello" }

[[block.slots.INPUTS]]
type = "dummy_input"
"#,
    );
    let (artifact, _) = run(&source);
    let doc = document(&artifact);
    assert_eq!(doc["message0"], "%1");
    assert_eq!(
        doc["args0"],
        json!([{ "type": "field_input", "name": "MSG", "text": "hello" }])
    );
}

#[test]
fn dummy_followed_by_an_input_counts() {
    let source = creator(
        "BLOCK_NAME = \"wait\"",
        r#"
[[block.slots.INPUTS]]
type = "dummy_input"
fields = { ALIGN = "RIGHT" }

[[block.slots.INPUTS.slots.FIELDS]]
type = "text_label"
fields = { TEXT = "wait for" }

[[block.slots.INPUTS]]
type = "input_value"
fields = { INPUTNAME = "SECONDS" }
"#,
    );
    let (artifact, _) = run(&source);
    let doc = document(&artifact);
    assert_eq!(doc["message0"], "%1 %2 %3");
    assert_eq!(
        doc["args0"],
        json!([
            { "type": "field_label", "name": "", "text": "wait for" },
            { "type": "input_dummy", "align": "RIGHT" },
            { "type": "input_value", "name": "SECONDS" }
        ])
    );
}

#[test]
fn type_constraints_become_checks_not_arguments() {
    let source = creator(
        "BLOCK_NAME = \"join\"",
        r#"
[[block.slots.INPUTS]]
type = "input_value"
fields = { INPUTNAME = "LEFT" }

[[block.slots.INPUTS.slots.TYPE]]
type = "type_number"

[[block.slots.INPUTS]]
type = "input_value"
fields = { INPUTNAME = "RIGHT" }

[[block.slots.INPUTS.slots.TYPE]]
type = "type_group"

[[block.slots.INPUTS.slots.TYPE.slots.TYPE0]]
type = "type_string"

[[block.slots.INPUTS.slots.TYPE.slots.TYPE1]]
type = "type_boolean"

[[block.slots.INPUTS]]
type = "input_statement"
fields = { INPUTNAME = "DO" }

[[block.slots.INPUTS.slots.TYPE]]
type = "type_other"
fields = { TYPE = "Action" }
"#,
    );
    let (artifact, warnings) = run(&source);
    assert!(warnings.is_empty(), "{:?}", warnings);
    let doc = document(&artifact);
    assert_eq!(doc["message0"], "%1 %2 %3");
    assert_eq!(doc["args0"][0]["check"], "Number");
    assert_eq!(doc["args0"][1]["check"], json!(["String", "Boolean"]));
    assert_eq!(doc["args0"][2]["check"], "Action");
}

#[test]
fn unconstrained_inputs_have_no_check() {
    let source = creator(
        "BLOCK_NAME = \"any\"",
        r#"
[[block.slots.INPUTS]]
type = "input_value"

[[block.slots.INPUTS.slots.TYPE]]
type = "type_null"
"#,
    );
    let (artifact, _) = run(&source);
    let doc = document(&artifact);
    assert_eq!(doc["message0"], "%1");
    assert_eq!(doc["args0"], json!([{ "type": "input_value", "name": "NAME" }]));
}

#[test]
fn numeric_bounds_only_when_finite() {
    let unbounded = creator(
        "BLOCK_NAME = \"n\"",
        "[[block.slots.INPUTS]]\ntype = \"numeric_input\"\n",
    );
    let (artifact, _) = run(&unbounded);
    let arg = &document(&artifact)["args0"][0];
    assert_eq!(arg["value"], 0);
    assert!(arg.get("min").is_none());
    assert!(arg.get("max").is_none());
    assert!(arg.get("precision").is_none());

    let bounded = creator(
        "BLOCK_NAME = \"n\"",
        "[[block.slots.INPUTS]]\ntype = \"numeric_input\"\nfields = { MIN = 0, MAX = 10, PRECISION = 0.1 }\n",
    );
    let (artifact, _) = run(&bounded);
    let arg = &document(&artifact)["args0"][0];
    assert_eq!(arg["min"], 0);
    assert_eq!(arg["max"], 10);
    assert_eq!(arg["precision"], 0.1);
}

#[test]
fn left_output_returns_an_expression() {
    let source = creator(
        "BLOCK_NAME = \"distance\", DROPDOWN_CONNECTIONS = \"OPTION_CONNECTIONS_LEFT\"",
        "[[block.slots.INPUTS]]\ntype = \"text_input\"\nfields = { FIELDNAME = \"TO\" }\n",
    );
    let (artifact, _) = run(&source);
    assert!(artifact
        .glue_body
        .ends_with("';\nreturn [code, Blockly.JavaScript.ORDER_NONE];\n"));
    let doc = document(&artifact);
    assert_eq!(doc.get("output"), Some(&Value::Null));
    assert!(doc.get("previousStatement").is_none());
}

#[test]
fn statement_shapes_return_a_line() {
    for (option, keys) in [
        ("OPTION_CONNECTIONS_TOP_BOTTOM", &["previousStatement", "nextStatement"][..]),
        ("OPTION_CONNECTIONS_TOP", &["previousStatement"][..]),
        ("OPTION_CONNECTIONS_BOTTOM", &["nextStatement"][..]),
        ("OPTION_CONNECTIONS_NONE", &[][..]),
    ] {
        let source = creator(
            &format!("BLOCK_NAME = \"step\", DROPDOWN_CONNECTIONS = \"{}\"", option),
            "[[block.slots.INPUTS]]\ntype = \"text_input\"\n",
        );
        let (artifact, _) = run(&source);
        assert!(artifact.glue_body.ends_with(";\\n';\nreturn code;"), "{}", option);

        let doc = document(&artifact);
        let object = doc.as_object().unwrap();
        for key in ["output", "previousStatement", "nextStatement"] {
            assert_eq!(object.contains_key(key), keys.contains(&key), "{} {}", option, key);
        }
    }
}

#[test]
fn layout_and_unknown_category() {
    let source = creator(
        "BLOCK_NAME = \"x\", DROPDOWN_INPUT = \"OPTION_INLINE\", BLOCK_CATEGORY = \"CATEGORY_SOUND\", FIELD_TOOLTIP = \"Says \\\"x\\\"\"",
        "[[block.slots.INPUTS]]\ntype = \"text_input\"\n",
    );
    let (artifact, _) = run(&source);
    assert!(artifact.definition.contains("\"inputsInline\": true,"));
    assert!(artifact.definition.contains("\"colour\": 230,"));
    let doc = document(&artifact);
    assert_eq!(doc["tooltip"], "Says \"x\"");
}

#[test]
fn dead_nodes_emit_nothing() {
    let source = format!(
        "{}\n{}",
        GO_FORWARD,
        r#"
[[block]]
type = "input_value"
fields = { INPUTNAME = "ORPHAN" }

[[block.slots.FIELDS]]
type = "text_input"
fields = { FIELDNAME = "Lost" }
"#
    );
    let (artifact, warnings) = run(&source);
    assert!(warnings.is_empty(), "{:?}", warnings);
    for text in [
        &artifact.definition,
        &artifact.glue_declaration,
        &artifact.glue_body,
    ] {
        assert!(!text.contains("ORPHAN"));
        assert!(!text.contains("Lost"));
    }
    let (alone, _) = run(GO_FORWARD);
    assert_eq!(artifact, alone);
}

#[test]
fn dropdown_options_keep_their_order() {
    let source = creator(
        "BLOCK_NAME = \"pick\"",
        r#"
[[block.slots.INPUTS]]
type = "field_dropdown"
options = ["text", "image"]

[block.slots.INPUTS.fields]
FIELDNAME = "CHOICE"
USER0 = "left"
CPU0 = "LEFT"
SRC1 = "arrow.png"
WIDTH1 = 16
HEIGHT1 = 16
ALT1 = "<"
CPU1 = "ARROW"
"#,
    );
    let (artifact, _) = run(&source);
    assert_eq!(
        document(&artifact)["args0"][0]["options"],
        json!([
            ["left", "LEFT"],
            [{ "src": "arrow.png", "width": 16, "height": 16, "alt": "<" }, "ARROW"]
        ])
    );
    assert!(artifact
        .glue_body
        .starts_with("var dropdown_choice = block.getFieldValue('CHOICE');\n"));
}

#[test]
fn every_field_kind_yields_valid_json() {
    let source = creator(
        "BLOCK_NAME = \"kitchen sink\", DROPDOWN_CONNECTIONS = \"OPTION_CONNECTIONS_TOP_BOTTOM\"",
        r#"
[[block.slots.INPUTS]]
type = "input_statement"
fields = { INPUTNAME = "BODY" }

[[block.slots.INPUTS.slots.FIELDS]]
type = "text_label"
fields = { TEXT = "a \"quoted\" label" }

[[block.slots.INPUTS.slots.FIELDS]]
type = "angle_input"
fields = { FIELDNAME = "HEADING" }

[[block.slots.INPUTS.slots.FIELDS]]
type = "field_checkbox"
fields = { FIELDNAME = "ON" }

[[block.slots.INPUTS.slots.FIELDS]]
type = "field_colour"
fields = { FIELDNAME = "TINT" }

[[block.slots.INPUTS.slots.FIELDS]]
type = "field_variable"
fields = { FIELDNAME = "VAR" }

[[block.slots.INPUTS.slots.FIELDS]]
type = "field_image"

[[block.slots.INPUTS.slots.TYPE]]
type = "type_list"
"#,
    );
    let (artifact, warnings) = run(&source);
    assert!(warnings.is_empty(), "{:?}", warnings);
    let doc = document(&artifact);
    assert_eq!(doc["type"], "kitchen_sink");
    assert_eq!(doc["message0"], "%1 %2 %3 %4 %5 %6 %7");
    assert_eq!(doc["args0"][0]["text"], "a \"quoted\" label");
    assert_eq!(doc["args0"][1]["angle"], 90);
    assert_eq!(doc["args0"][2]["checked"], true);
    assert_eq!(doc["args0"][3]["colour"], "#ff0000");
    assert_eq!(doc["args0"][4]["variable"], "item");
    assert_eq!(doc["args0"][5]["flipRtl"], false);
    assert_eq!(doc["args0"][6]["check"], "Array");

    let declared = [
        "statements_body",
        "angle_heading",
        "checkbox_on",
        "colour_tint",
        "variable_var",
    ];
    for local in declared {
        assert!(artifact.glue_body.contains(&format!("var {} = ", local)), "{}", local);
    }
    assert!(artifact
        .glue_declaration
        .contains("async function(BODY,HEADING,ON,TINT,VAR,callback)"));
    assert!(artifact.glue_body.contains(
        "var code = 'kitchen_sink(\" ' + statements_body + ' \",\" ' + angle_heading + ' \",\" ' + checkbox_on + ' \",\" ' + colour_tint + ' \",\" ' + variable_var + ' \");\\n';"
    ));
}

#[test]
fn names_keep_case_in_glue_only() {
    let source = creator(
        "BLOCK_NAME = \"Turn Left!\", BLOCK_CATEGORY = \"CATEGORY_LOGIC\", FIELD_DESCRIPTION = \"Turns\"",
        "[[block.slots.INPUTS]]\ntype = \"text_input\"\nfields = { FIELDNAME = \"By How Much\" }\n",
    );
    let (artifact, _) = run(&source);
    assert_eq!(artifact.block_type, "turn_left_");
    assert!(artifact.glue_declaration.contains("function initTurn_Left_("));
    assert!(artifact
        .glue_body
        .starts_with("var text_by_how_much = block.getFieldValue('By_How_Much');\n"));

    let export = &artifact.export;
    assert_eq!(export.file_name, "Turn_Left_.js");
    assert_eq!(export.custom_name, "Turn_Left_");
    assert_eq!(export.category, "Logic");
    assert_eq!(export.description, "Turns");
    assert_eq!(export.json_code, artifact.definition);
    assert_eq!(export.js_code, artifact.glue_body);
    assert_eq!(export.interpreter_declaration, artifact.glue_declaration);
}

#[test]
fn no_root_is_an_error() {
    assert_eq!(generate(&Composition::new()), Err(GenerationError::NoRoot));

    let stray = load("[[block]]\ntype = \"numeric_input\"\n");
    assert_eq!(generate(&stray), Err(GenerationError::NoRoot));
}

#[test]
fn first_of_several_roots_wins() {
    let source = format!(
        "{}\n[[block]]\ntype = \"block_creator\"\nfields = {{ BLOCK_NAME = \"second\" }}\n",
        GO_FORWARD
    );
    let (artifact, warnings) = run(&source);
    assert_eq!(artifact.block_type, "go_forward");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].error, GenerationError::MultipleRoots(2));
    assert!(warnings[0].is_warning);
}

#[test]
fn empty_block_warns_and_omits_message() {
    let (artifact, warnings) = run("[[block]]\ntype = \"block_creator\"\n");
    let doc = document(&artifact);
    assert_eq!(doc["type"], "block_type");
    assert!(doc.get("message0").is_none());
    assert!(doc.get("args0").is_none());
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].error, GenerationError::NoLiveFields);
    assert!(artifact.glue_body.starts_with("var code = 'block_type()"));
    assert!(artifact.glue_declaration.contains("async function(callback)"));
}

#[test]
fn invalid_checkbox_value_falls_back() {
    let source = creator(
        "BLOCK_NAME = \"b\"",
        "[[block.slots.INPUTS]]\ntype = \"field_checkbox\"\nfields = { CHECKED = \"maybe\" }\n",
    );
    let (artifact, warnings) = run(&source);
    assert_eq!(document(&artifact)["args0"][0]["checked"], true);
    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        &warnings[0].error,
        GenerationError::InvalidFieldValue { field, value, .. } if field == "CHECKED" && value == "maybe"
    ));
}

/// A host tree whose inputs were built without a `TYPE` slot.
struct WithoutTypeSlots<'a>(&'a Composition);

impl CompositionTree for WithoutTypeSlots<'_> {
    fn top_blocks(&self) -> Vec<NodeId> {
        self.0.top_blocks()
    }
    fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.0.kind(node)
    }
    fn field(&self, node: NodeId, key: &str) -> Option<&FieldValue> {
        self.0.field(node, key)
    }
    fn mutation(&self, node: NodeId) -> Option<&Mutation> {
        self.0.mutation(node)
    }
    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.0.children(node)
    }
    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.0.next_sibling(node)
    }
    fn surrounding_parent(&self, node: NodeId) -> Option<NodeId> {
        self.0.surrounding_parent(node)
    }
    fn has_slot(&self, node: NodeId, slot: &str) -> bool {
        slot != slot::TYPE && self.0.has_slot(node, slot)
    }
    fn slot_target(&self, node: NodeId, slot: &str) -> Option<NodeId> {
        if slot == slot::TYPE {
            return None;
        }
        self.0.slot_target(node, slot)
    }
}

#[test]
fn missing_type_slot_means_any_type() {
    let comp = load(&creator(
        "BLOCK_NAME = \"v\"",
        "[[block.slots.INPUTS]]\ntype = \"input_value\"\nfields = { INPUTNAME = \"X\" }\n",
    ));
    let input = comp.slot_target(NodeId(0), slot::INPUTS).unwrap();

    let (artifact, warnings) = generate(&WithoutTypeSlots(&comp)).unwrap();
    assert_eq!(
        document(&artifact)["args0"],
        json!([{ "type": "input_value", "name": "X" }])
    );
    assert_eq!(
        warnings,
        vec![GenerationDiagnostic::warning(
            GenerationError::MissingRequiredSlot {
                node: input,
                slot: "TYPE".to_string()
            },
            Some(input)
        )]
    );
}

#[test]
fn export_serializes_with_editor_keys() {
    let (artifact, _) = run(GO_FORWARD);
    let json = artifact.export.to_json_pretty().unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["fileName"], "go_forward.js");
    assert_eq!(value["category"], "Movement");
    assert_eq!(value["customName"], "go_forward");
    assert_eq!(value["jsonCode"], artifact.definition.as_str());
}
