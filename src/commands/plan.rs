//! Plan command - compute the planned state offline

use anyhow::Result;
use declarative::{PlanResult, ResourceState, TypedValue};

use super::{load_state, registry, write_state};
use crate::Context;
use crate::cli::PlanArgs;
use crate::ui;

pub fn run(ctx: &Context, args: PlanArgs) -> Result<()> {
    let registry = registry()?;
    let schema = registry.lookup(&args.type_name)?;

    let prior = load_state(schema, args.prior.as_deref())?;
    let proposed = load_state(schema, args.proposed.as_deref())?;

    let result = declarative::plan::plan(schema, prior.as_ref(), proposed.as_ref())?;

    if !ctx.quiet {
        show(&args.type_name, prior.as_ref(), &result);
    }

    write_state(args.out.as_deref(), result.planned.as_ref())
}

fn show(type_name: &str, prior: Option<&ResourceState>, result: &PlanResult) {
    ui::header(type_name);
    ui::kv("operation", &ui::op_label(result.op));

    if let Some(planned) = &result.planned {
        for (name, from, to) in changes(prior, planned) {
            ui::kv(&name, &format!("{from} → {to}"));
        }
    }

    if !result.requires_replace.is_empty() {
        ui::warn(&format!(
            "Changing {} requires replacing the object",
            result.requires_replace.join(", ")
        ));
    }
}

/// Attributes whose planned value differs from prior
fn changes(prior: Option<&ResourceState>, planned: &ResourceState) -> Vec<(String, TypedValue, TypedValue)> {
    planned
        .attributes
        .iter()
        .filter_map(|(name, to)| {
            let from = prior.map_or(TypedValue::Null, |p| p.get(name).clone());
            (&from != to).then(|| (name.clone(), from, to.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_on_create() {
        let planned = ResourceState::new("salesforce_user_role")
            .with("id", TypedValue::Unknown)
            .with("name", "CEO")
            .with("parent_role_id", TypedValue::Null);

        let changes = changes(None, &planned);
        let names: Vec<&str> = changes.iter().map(|(n, _, _)| n.as_str()).collect();
        assert_eq!(names, vec!["id", "name"]);
    }

    #[test]
    fn test_changes_on_update() {
        let prior = ResourceState::new("salesforce_user_role")
            .with("id", "00E1")
            .with("name", "CEO");
        let planned = prior.clone().with("name", "Chief Executive");

        let changes = changes(Some(&prior), &planned);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].0, "name");
        assert_eq!(changes[0].1, TypedValue::from("CEO"));
    }
}
