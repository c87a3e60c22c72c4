//! Plan engine - decides what apply should do
//!
//! Planning is a pure function of the schema and two snapshots. It never
//! talks to the remote, so the same inputs always give the same plan.

use crate::error::{Error, Result};
use crate::schema::{AttributeSpec, ID_ATTRIBUTE, ResourceSchema};
use crate::types::{Operation, PlanResult, ResourceState};
use crate::value::{Attributes, TypedValue};

/// Compute the planned state and operation for a resource.
///
/// - no proposed state: destroy (or nothing, if there was no prior either)
/// - no prior state: create, with computed attributes left unknown
/// - both: update, where computed attributes the caller left unset keep
///   their prior value; an update that changes nothing is a no-op
///
/// Attributes are matched by name only.
pub fn plan(
    schema: &ResourceSchema,
    prior: Option<&ResourceState>,
    proposed: Option<&ResourceState>,
) -> Result<PlanResult> {
    let Some(proposed) = proposed else {
        let op = if prior.is_some() {
            Operation::Destroy
        } else {
            Operation::NoOp
        };
        log::debug!("{}: planned {op}", schema.type_name);
        return Ok(PlanResult {
            planned: None,
            op,
            requires_replace: Vec::new(),
        });
    };

    validate(schema, proposed)?;

    let mut attributes = Attributes::new();
    for spec in &schema.attributes {
        let mut value = proposed.get(&spec.name).clone();
        if value.is_null()
            && let Some(default) = &spec.default
        {
            value = default.clone();
        }
        let value = match prior {
            None => create_value(spec, value),
            Some(prior) => update_value(spec, value, prior),
        };
        attributes.insert(spec.name.clone(), value);
    }
    let planned = ResourceState {
        type_name: schema.type_name.clone(),
        attributes,
    };

    let (op, requires_replace) = match prior {
        None => (Operation::Create, Vec::new()),
        Some(prior) => {
            let changed: Vec<&AttributeSpec> = schema
                .attributes
                .iter()
                .filter(|s| planned.get(&s.name) != prior.get(&s.name))
                .collect();
            let requires_replace = changed
                .iter()
                .filter(|s| s.immutable)
                .map(|s| s.name.clone())
                .collect();
            let op = if changed.is_empty() {
                Operation::NoOp
            } else {
                Operation::Update
            };
            (op, requires_replace)
        }
    };

    log::debug!("{}: planned {op}", schema.type_name);
    log::trace!("{}: planned state {}", schema.type_name, ResourceState::to_value(Some(&planned)));

    Ok(PlanResult {
        planned: Some(planned),
        op,
        requires_replace,
    })
}

fn create_value(spec: &AttributeSpec, value: TypedValue) -> TypedValue {
    if spec.is_computed_only() || (spec.computed && value.is_null()) {
        TypedValue::Unknown
    } else {
        value
    }
}

fn update_value(spec: &AttributeSpec, value: TypedValue, prior: &ResourceState) -> TypedValue {
    if spec.name == ID_ATTRIBUTE || spec.is_computed_only() || (spec.computed && value.is_null()) {
        prior.get(&spec.name).clone()
    } else {
        value
    }
}

/// Check a proposed state against its schema.
pub fn validate(schema: &ResourceSchema, proposed: &ResourceState) -> Result<()> {
    if proposed.type_name != schema.type_name {
        return Err(Error::schema(
            &schema.type_name,
            format!("state belongs to resource type {:?}", proposed.type_name),
        ));
    }

    for (name, value) in &proposed.attributes {
        let spec = schema.get(name).ok_or_else(|| {
            Error::schema(&schema.type_name, format!("unsupported attribute {name:?}"))
        })?;
        if !value.conforms_to(spec.ty) {
            return Err(Error::schema(
                &schema.type_name,
                format!("attribute {name:?} must be a {}, got {value}", spec.ty),
            ));
        }
    }

    for spec in schema.attributes.iter().filter(|s| s.required) {
        if proposed.get(&spec.name).is_null() {
            return Err(Error::schema(
                &schema.type_name,
                format!("attribute {:?} is required", spec.name),
            ));
        }
    }

    Ok(())
}
