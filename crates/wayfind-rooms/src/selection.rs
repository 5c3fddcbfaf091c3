//! Goal-room selection policies.

use serde::{Deserialize, Serialize};
use wayfind_core::{ConfigError, Vec3};

/// How the goal room is chosen at each reset.
///
/// Exactly one policy is active per configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GoalSelection {
    /// Uniformly at random over all rooms.
    #[default]
    Global,
    /// Uniformly at random over rooms whose center lies within `radius`
    /// of `center`. Without a configured center, agent 0's spawn
    /// position of the current episode is used.
    WithinRadius {
        /// Search radius.
        radius: f32,
        /// Fixed reference point.
        #[serde(default)]
        center: Option<Vec3>,
    },
}

impl GoalSelection {
    /// Check that the radius, if any, is finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Self::WithinRadius { radius, center } = self {
            if !radius.is_finite() || *radius <= 0.0 {
                return Err(ConfigError::InvalidParameter {
                    name: "goal_selection.radius",
                    reason: format!("must be finite and positive, got {radius}"),
                });
            }
            if let Some(c) = center {
                if !c.is_finite() {
                    return Err(ConfigError::InvalidParameter {
                        name: "goal_selection.center",
                        reason: "must be finite".to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_is_default_and_valid() {
        assert_eq!(GoalSelection::default(), GoalSelection::Global);
        assert!(GoalSelection::Global.validate().is_ok());
    }

    #[test]
    fn non_positive_radius_rejected() {
        let sel = GoalSelection::WithinRadius {
            radius: 0.0,
            center: None,
        };
        assert!(matches!(
            sel.validate(),
            Err(ConfigError::InvalidParameter {
                name: "goal_selection.radius",
                ..
            })
        ));
    }

    #[test]
    fn nan_center_rejected() {
        let sel = GoalSelection::WithinRadius {
            radius: 10.0,
            center: Some(Vec3::new(f32::NAN, 0.0, 0.0)),
        };
        assert!(sel.validate().is_err());
    }
}
