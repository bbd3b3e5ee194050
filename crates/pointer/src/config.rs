//! Session configuration: intersection filter and tuning knobs.

use crate::error::PointerError;
use crate::scene::Intersectable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Predicate deciding which scene objects are raycast candidates.
#[derive(Clone)]
pub struct IntersectionFilter {
    predicate: Rc<dyn Fn(&dyn Intersectable) -> bool>,
    label: String,
}

impl IntersectionFilter {
    /// Accept every object.
    pub fn all() -> Self {
        Self {
            predicate: Rc::new(|_: &dyn Intersectable| true),
            label: "all".into(),
        }
    }

    /// Accept objects carrying `flag`.
    pub fn flag(flag: impl Into<String>) -> Self {
        let flag = flag.into();
        let label = format!("flag:{flag}");
        Self {
            predicate: Rc::new(move |object: &dyn Intersectable| object.has_flag(&flag)),
            label,
        }
    }

    /// Accept objects for which `predicate` returns true.
    pub fn from_fn(predicate: impl Fn(&dyn Intersectable) -> bool + 'static) -> Self {
        Self {
            predicate: Rc::new(predicate),
            label: "custom".into(),
        }
    }

    /// Evaluate the filter.
    pub fn accepts(&self, object: &dyn Intersectable) -> bool {
        (self.predicate)(object)
    }
}

impl Default for IntersectionFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Debug for IntersectionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntersectionFilter")
            .field(&self.label)
            .finish()
    }
}

/// Serializable pointer settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PointerSettings {
    /// Rotate the camera from mouse motion (screen pointer mode only).
    pub camera_follow_mouse: bool,
    /// Drive a virtual controller from the mouse when no tracked device exists.
    pub mouse_simulates_controller: bool,
    /// Radians of camera rotation per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    /// Yaw offset in radians when the cursor sits on the left/right edge.
    pub simulated_yaw_range: f32,
    /// Pitch offset in radians when the cursor sits on the top/bottom edge.
    pub simulated_pitch_range: f32,
    /// Distance in front of the camera where the virtual controller sits.
    pub simulated_forward_offset: f32,
    /// Ignore hits farther than this; unlimited when absent.
    pub max_distance: Option<f32>,
    /// Only objects with this flag are candidates; all objects when absent.
    pub filter_flag: Option<String>,
}

impl Default for PointerSettings {
    fn default() -> Self {
        Self {
            camera_follow_mouse: false,
            mouse_simulates_controller: false,
            // ~0.17° per pixel
            mouse_sensitivity: 0.003,
            simulated_yaw_range: 0.5,
            simulated_pitch_range: 0.35,
            simulated_forward_offset: 0.3,
            max_distance: None,
            filter_flag: None,
        }
    }
}

impl PointerSettings {
    /// Reject combinations and values the session cannot honor.
    pub fn validate(&self) -> Result<(), PointerError> {
        if self.camera_follow_mouse && self.mouse_simulates_controller {
            return Err(PointerError::ConflictingMouseModes);
        }
        check_non_negative("mouse_sensitivity", self.mouse_sensitivity)?;
        check_angle("simulated_yaw_range", self.simulated_yaw_range)?;
        check_angle("simulated_pitch_range", self.simulated_pitch_range)?;
        check_non_negative("simulated_forward_offset", self.simulated_forward_offset)?;
        if let Some(max_distance) = self.max_distance {
            if max_distance.is_nan() || max_distance <= 0.0 {
                return Err(PointerError::InvalidSetting {
                    name: "max_distance",
                    reason: format!("must be positive, got {max_distance}"),
                });
            }
        }
        Ok(())
    }
}

fn check_non_negative(name: &'static str, value: f32) -> Result<(), PointerError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PointerError::InvalidSetting {
            name,
            reason: format!("must be a finite non-negative number, got {value}"),
        })
    }
}

fn check_angle(name: &'static str, value: f32) -> Result<(), PointerError> {
    check_non_negative(name, value)?;
    if value > std::f32::consts::FRAC_PI_2 {
        return Err(PointerError::InvalidSetting {
            name,
            reason: format!("must not exceed π/2, got {value}"),
        });
    }
    Ok(())
}

/// Immutable configuration for one pointer session.
#[derive(Debug, Clone, Default)]
pub struct PointerConfig {
    /// Which objects are raycast candidates.
    pub filter: IntersectionFilter,
    /// Tuning knobs and mode flags.
    pub settings: PointerSettings,
}

impl PointerConfig {
    /// Build a config, deriving the filter from `settings.filter_flag`.
    pub fn new(settings: PointerSettings) -> Self {
        let filter = match &settings.filter_flag {
            Some(flag) => IntersectionFilter::flag(flag.clone()),
            None => IntersectionFilter::all(),
        };
        Self { filter, settings }
    }

    /// Replace the intersection filter.
    pub fn with_filter(mut self, filter: IntersectionFilter) -> Self {
        self.filter = filter;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneObject;

    #[test]
    fn default_settings_validate() {
        assert_eq!(PointerSettings::default().validate(), Ok(()));
    }

    #[test]
    fn both_mouse_modes_are_rejected() {
        let settings = PointerSettings {
            camera_follow_mouse: true,
            mouse_simulates_controller: true,
            ..Default::default()
        };
        assert_eq!(settings.validate(), Err(PointerError::ConflictingMouseModes));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let settings = PointerSettings {
            simulated_yaw_range: 3.0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(PointerError::InvalidSetting {
                name: "simulated_yaw_range",
                ..
            })
        ));

        let settings = PointerSettings {
            max_distance: Some(0.0),
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = PointerSettings {
            mouse_sensitivity: f32::NAN,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn filter_flag_builds_flag_filter() {
        let config = PointerConfig::new(PointerSettings {
            filter_flag: Some("clickable".into()),
            ..Default::default()
        });
        let cube = SceneObject::new("cube").with_flag("clickable");
        let floor = SceneObject::new("floor");
        assert!(config.filter.accepts(&cube));
        assert!(!config.filter.accepts(&floor));
        assert_eq!(format!("{:?}", config.filter), "IntersectionFilter(\"flag:clickable\")");
    }

    #[test]
    fn custom_filter_sees_names() {
        let filter = IntersectionFilter::from_fn(|object| object.name().starts_with("btn"));
        assert!(filter.accepts(&SceneObject::new("btn_ok")));
        assert!(!filter.accepts(&SceneObject::new("wall")));
    }
}
