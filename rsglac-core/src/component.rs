use crate::errors::{GlacError, GlacResult};
use crate::standard_variables::VariableDefinition;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Spatial layout of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridType {
    /// `[y, x]`
    Spatial,
    /// `[month, y, x]` with twelve months
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequirementType {
    Input,
    Output,
}

/// A variable a component consumes or produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementDefinition {
    pub variable_name: String,
    pub unit: String,
    pub requirement_type: RequirementType,
    pub grid_type: GridType,
    /// Inputs that may be absent (e.g. an ice mask)
    pub optional: bool,
}

impl RequirementDefinition {
    pub fn new(
        variable_name: &str,
        unit: &str,
        requirement_type: RequirementType,
        grid_type: GridType,
    ) -> Self {
        Self {
            variable_name: variable_name.to_string(),
            unit: unit.to_string(),
            requirement_type,
            grid_type,
            optional: false,
        }
    }

    pub fn input(variable: &VariableDefinition) -> Self {
        Self::new(
            variable.name,
            variable.unit,
            RequirementType::Input,
            variable.grid_type,
        )
    }

    pub fn output(variable: &VariableDefinition) -> Self {
        Self::new(
            variable.name,
            variable.unit,
            RequirementType::Output,
            variable.grid_type,
        )
    }

    /// Override the unit of a standard variable
    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    pub fn into_optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Component of the glacier climate chain
///
/// The update methods of each component take typed arrays and differ in their
/// arguments, so the trait only describes the variables a component exchanges.
pub trait Component: Debug {
    fn name(&self) -> &str;

    fn definitions(&self) -> Vec<RequirementDefinition>;

    fn inputs(&self) -> Vec<RequirementDefinition> {
        self.definitions()
            .into_iter()
            .filter(|d| d.requirement_type == RequirementType::Input)
            .collect()
    }

    fn outputs(&self) -> Vec<RequirementDefinition> {
        self.definitions()
            .into_iter()
            .filter(|d| d.requirement_type == RequirementType::Output)
            .collect()
    }
}

/// Check that every input of `consumer` is available with a matching unit and layout
///
/// `available` lists the outputs of upstream components together with the variables
/// supplied by the host model.
pub fn verify_inputs(
    consumer: &dyn Component,
    available: &[RequirementDefinition],
) -> GlacResult<()> {
    for input in consumer.inputs() {
        let provided = available
            .iter()
            .find(|d| d.variable_name == input.variable_name);
        let mismatch = |found: String| GlacError::RequirementMismatch {
            variable: input.variable_name.clone(),
            consumer: consumer.name().to_string(),
            expected_unit: input.unit.clone(),
            found,
        };

        match provided {
            None if input.optional => {
                debug!(
                    "Optional input {} of {} is not provided",
                    input.variable_name,
                    consumer.name()
                );
            }
            None => return Err(mismatch("nothing provides it".to_string())),
            Some(d) if d.unit != input.unit => {
                return Err(mismatch(format!("it is provided in [{}]", d.unit)))
            }
            Some(d) if d.grid_type != input.grid_type => {
                return Err(mismatch(format!(
                    "it is provided on a {:?} grid instead of {:?}",
                    d.grid_type, input.grid_type
                )))
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard_variables::{VAR_AIR_TEMPERATURE, VAR_ICE_MASK, VAR_PRECIPITATION};

    #[derive(Debug)]
    struct Consumer;

    impl Component for Consumer {
        fn name(&self) -> &str {
            "consumer"
        }

        fn definitions(&self) -> Vec<RequirementDefinition> {
            vec![
                RequirementDefinition::input(&VAR_AIR_TEMPERATURE),
                RequirementDefinition::input(&VAR_PRECIPITATION),
                RequirementDefinition::input(&VAR_ICE_MASK).into_optional(),
            ]
        }
    }

    #[test]
    fn inputs_and_outputs_are_split() {
        let consumer = Consumer;
        assert_eq!(consumer.inputs().len(), 3);
        assert!(consumer.outputs().is_empty());
    }

    #[test]
    fn matching_outputs_satisfy_inputs() {
        let available = vec![
            RequirementDefinition::output(&VAR_AIR_TEMPERATURE),
            RequirementDefinition::output(&VAR_PRECIPITATION),
        ];
        verify_inputs(&Consumer, &available).unwrap();
    }

    #[test]
    fn missing_and_mismatched_units_fail() {
        let available = vec![RequirementDefinition::output(&VAR_AIR_TEMPERATURE)];
        match verify_inputs(&Consumer, &available) {
            Err(GlacError::RequirementMismatch { variable, .. }) => {
                assert_eq!(variable, VAR_PRECIPITATION.name)
            }
            other => panic!("unexpected {other:?}"),
        }

        let available = vec![
            RequirementDefinition::output(&VAR_AIR_TEMPERATURE).with_unit("K"),
            RequirementDefinition::output(&VAR_PRECIPITATION),
        ];
        let err = verify_inputs(&Consumer, &available).unwrap_err();
        assert!(err.to_string().contains("[K]"));
    }
}
