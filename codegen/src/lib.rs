pub mod artifact;
pub mod definition;
pub mod error;
pub mod gate;
pub mod generator;
pub mod glue;
pub mod template;
pub mod vocab;

use blockdef::node::field;
use blockdef::{CompositionTree, NodeId, NodeKind};

pub use artifact::{BlockExport, DELIMITER, GeneratedArtifact, split_glue};
pub use definition::{Definition, DefinitionGenerator};
pub use error::{GenerationDiagnostic, GenerationError};
pub use generator::CodeGenerator;
pub use glue::{DeclaredVariable, Glue, GlueGenerator};

use vocab::Category;

/// Generate the definition document, the glue code and the export object for
/// the first `block_creator` in `tree`.
///
/// Only a tree without any `block_creator` fails; every other problem is
/// resolved to a default and reported in the returned warnings.
pub fn generate(
    tree: &dyn CompositionTree,
) -> Result<(GeneratedArtifact, Vec<GenerationDiagnostic>), GenerationError> {
    let roots = find_roots(tree);
    let Some(&root) = roots.first() else {
        return Err(GenerationError::NoRoot);
    };

    let mut diagnostics = Vec::new();
    if roots.len() > 1 {
        diagnostics.push(GenerationDiagnostic::warning(
            GenerationError::MultipleRoots(roots.len()),
            Some(root),
        ));
    }

    let (definition, warnings) = DefinitionGenerator::new(tree).generate(root);
    diagnostics.extend(warnings);
    let (glue, warnings) = GlueGenerator::new(tree).generate(root);
    for warning in warnings {
        if !diagnostics.contains(&warning) {
            diagnostics.push(warning);
        }
    }

    let export = export(tree, root, &definition, &glue);
    tracing::debug!(
        block = %definition.block_type,
        nodes = tree.descendant_count(root),
        warnings = diagnostics.len(),
        "generation finished"
    );

    let artifact = GeneratedArtifact {
        block_type: definition.block_type,
        definition: definition.document,
        glue_declaration: glue.declaration,
        glue_body: glue.body,
        export,
    };
    Ok((artifact, diagnostics))
}

fn find_roots(tree: &dyn CompositionTree) -> Vec<NodeId> {
    tree.top_blocks()
        .into_iter()
        .filter(|&id| tree.kind(id) == Some(NodeKind::BlockCreator))
        .collect()
}

fn export(tree: &dyn CompositionTree, root: NodeId, definition: &Definition, glue: &Glue) -> BlockExport {
    let text = |key: &str| {
        tree.field(root, key)
            .map(|v| v.to_string())
            .unwrap_or_default()
    };
    let category_option = text(field::BLOCK_CATEGORY);
    let category = Category::from_option(&category_option)
        .map(|c| c.label().to_string())
        .unwrap_or(category_option);

    BlockExport {
        file_name: format!("{}.js", glue.name),
        category,
        description: text(field::FIELD_DESCRIPTION),
        json_code: definition.document.clone(),
        interpreter_declaration: glue.declaration.clone(),
        js_code: glue.body.clone(),
        custom_name: glue.name.clone(),
    }
}
