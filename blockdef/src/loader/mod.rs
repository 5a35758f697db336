pub mod error;

use std::collections::BTreeMap;
use std::ops::Range;

use serde::Deserialize;
use toml::Spanned;

pub use error::LoadError;

use crate::composition::{Composition, CompositionError};
use crate::node::{FieldValue, Mutation, NodeId, NodeKind, OptionKind, field, slot};

/// Composition file layout: a list of top-level stacks.
#[derive(Debug, Deserialize)]
struct CompositionFile {
    #[serde(default, rename = "block")]
    blocks: Vec<NodeSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeSpec {
    #[serde(rename = "type")]
    kind: Spanned<NodeKind>,
    #[serde(default)]
    fields: BTreeMap<String, FieldValue>,
    /// Slot name → chain of nodes, linked in array order.
    #[serde(default)]
    slots: BTreeMap<String, Vec<NodeSpec>>,
    /// Dropdown option kinds. Inferred from the `CPUn`/`SRCn` fields when absent.
    #[serde(default)]
    options: Option<Vec<OptionKind>>,
    /// Type group slot count. Inferred from the highest `TYPEn` slot when absent.
    #[serde(default)]
    type_count: Option<usize>,
}

/// Loader entry point.
pub struct Loader {
    source: String,
    file_id: usize,
}

impl Loader {
    pub fn new(source: String, file_id: usize) -> Self {
        Loader { source, file_id }
    }

    /// Load the TOML source into a composition arena.
    pub fn load(&self) -> Result<Composition, Vec<LoadError>> {
        let file: CompositionFile = toml::from_str(&self.source)
            .map_err(|e| vec![LoadError::from_toml(&e, self.file_id)])?;

        let mut builder = Builder {
            composition: Composition::new(),
            errors: Vec::new(),
            file_id: self.file_id,
        };
        for spec in &file.blocks {
            builder.build(spec);
        }

        if !builder.errors.is_empty() {
            return Err(builder.errors);
        }
        tracing::debug!(
            nodes = builder.composition.len(),
            stacks = file.blocks.len(),
            "loaded composition"
        );
        Ok(builder.composition)
    }
}

struct Builder {
    composition: Composition,
    errors: Vec<LoadError>,
    file_id: usize,
}

impl Builder {
    fn build(&mut self, spec: &NodeSpec) -> NodeId {
        let kind = *spec.kind.get_ref();
        let span = spec.kind.span();
        let id = self.composition.add_node(kind);

        for (key, value) in &spec.fields {
            let result = self.composition.set_field(id, key, value.clone());
            self.check(result, &span);
        }

        if let Some(mutation) = self.mutation_for(spec, &span) {
            let result = self.composition.set_mutation(id, mutation);
            self.check(result, &span);
        }

        for (slot_name, chain) in &spec.slots {
            for child_spec in chain {
                let child = self.build(child_spec);
                let result = self.composition.attach(id, slot_name, child);
                if let Err(CompositionError::UnknownSlot { .. }) = &result {
                    let valid = slot_names(kind, spec);
                    let note = if valid.is_empty() {
                        format!("{} nodes have no slots", kind)
                    } else {
                        format!("{} nodes have: {}", kind, valid.join(", "))
                    };
                    self.errors.push(
                        LoadError::error(
                            format!("unknown slot `{}` on {}", slot_name, kind),
                            child_spec.kind.span(),
                            self.file_id,
                        )
                        .with_note(note),
                    );
                } else if let Err(CompositionError::SlotFull { .. }) = &result {
                    self.errors.push(
                        LoadError::error(
                            format!("`{}` of {} holds a single type constraint", slot_name, kind),
                            child_spec.kind.span(),
                            self.file_id,
                        )
                        .with_note("combine several constraints with a type_group"),
                    );
                } else {
                    self.check(result, &child_spec.kind.span());
                }
            }
        }

        id
    }

    fn mutation_for(&mut self, spec: &NodeSpec, span: &Range<usize>) -> Option<Mutation> {
        let kind = *spec.kind.get_ref();

        if spec.options.is_some() && kind != NodeKind::FieldDropdown {
            self.errors.push(LoadError::error(
                format!("`options` is only valid on field_dropdown, not {}", kind),
                span.clone(),
                self.file_id,
            ));
        }
        if spec.type_count.is_some() && kind != NodeKind::TypeGroup {
            self.errors.push(LoadError::error(
                format!("`type_count` is only valid on type_group, not {}", kind),
                span.clone(),
                self.file_id,
            ));
        }

        match kind {
            NodeKind::FieldDropdown => Some(Mutation::Dropdown(
                spec.options
                    .clone()
                    .unwrap_or_else(|| infer_options(&spec.fields)),
            )),
            NodeKind::TypeGroup => {
                let inferred = spec
                    .slots
                    .keys()
                    .filter_map(|name| name.strip_prefix(slot::TYPE)?.parse::<usize>().ok())
                    .map(|i| i + 1)
                    .max()
                    .unwrap_or(0);
                Some(Mutation::TypeGroup {
                    count: spec.type_count.unwrap_or(0).max(inferred),
                })
            }
            _ => None,
        }
    }

    fn check(&mut self, result: Result<(), CompositionError>, span: &Range<usize>) {
        if let Err(e) = result {
            self.errors
                .push(LoadError::error(e.to_string(), span.clone(), self.file_id));
        }
    }
}

/// Option kinds implied by indexed dropdown fields: an option exists for every
/// consecutive index carrying a value, and is an image when it has a source.
fn infer_options(fields: &BTreeMap<String, FieldValue>) -> Vec<OptionKind> {
    let mut kinds = Vec::new();
    loop {
        let i = kinds.len();
        let has = |key: &str| fields.contains_key(&field::indexed(key, i));
        if has(field::SRC) {
            kinds.push(OptionKind::Image);
        } else if has(field::OPTION_VALUE) || has(field::OPTION_TEXT) {
            kinds.push(OptionKind::Text);
        } else {
            return kinds;
        }
    }
}

fn slot_names(kind: NodeKind, spec: &NodeSpec) -> Vec<String> {
    let mut names: Vec<String> = kind.slot_names().iter().map(|s| s.to_string()).collect();
    if kind == NodeKind::TypeGroup {
        let count = spec.type_count.unwrap_or(0);
        names.extend((0..count).map(slot::type_n));
    }
    names
}
