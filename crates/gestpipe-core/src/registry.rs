use crate::error::GpResult;
use crate::sample::FingerStates;
use crate::template::GestureTemplate;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Read-only lookup of known gesture shapes, keyed by lowercase label.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, GestureTemplate>,
}

fn dynamic(right: [u8; 5], axis: (u8, u8), dx: f32, dy: f32, description: &str) -> GestureTemplate {
    GestureTemplate {
        left_fingers: FingerStates::CLOSED,
        right_fingers: FingerStates(right),
        main_axis_x: axis.0,
        main_axis_y: axis.1,
        delta_x: dx,
        delta_y: dy,
        is_static: false,
        description: description.to_string(),
    }
}

fn held(right: [u8; 5], description: &str) -> GestureTemplate {
    GestureTemplate {
        is_static: true,
        ..dynamic(right, (1, 1), 0.0, 0.0, description)
    }
}

impl TemplateRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The stock gesture set.
    pub fn new_with_defaults() -> Self {
        let mut reg = Self::empty();
        let stock = [
            ("rotate_down", dynamic([1, 1, 0, 0, 0], (0, 1), -0.002614, 0.185558, "Thumb and index, move down")),
            ("rotate_left", dynamic([1, 1, 0, 0, 0], (1, 0), -0.130413, -0.005325, "Thumb and index, move left")),
            ("rotate_up", dynamic([1, 1, 0, 0, 0], (0, 1), 0.028591, -0.185792, "Thumb and index, move up")),
            ("rotate_right", dynamic([1, 1, 0, 0, 0], (1, 0), 0.117388, 0.04424, "Thumb and index, move right")),
            ("zoom_in", dynamic([1, 1, 1, 0, 0], (0, 1), 0.0, -0.168766, "Three fingers, move up")),
            ("zoom_out", dynamic([1, 1, 1, 0, 0], (0, 1), 0.0, 0.168766, "Three fingers, move down")),
            ("previous_slide", dynamic([0, 1, 1, 0, 0], (1, 0), -0.15216, -0.016298, "Index and middle, swipe left")),
            ("next_slide", dynamic([0, 1, 1, 0, 0], (1, 0), 0.116381, 0.00673, "Index and middle, swipe right")),
            ("zoom_in_slide", dynamic([0, 1, 1, 0, 0], (0, 1), 0.0, -0.166767, "Index and middle, move up")),
            ("zoom_out_slide", dynamic([0, 1, 1, 0, 0], (0, 1), 0.0, 0.166767, "Index and middle, move down")),
            ("end_present", dynamic([1, 1, 1, 1, 1], (1, 0), -0.114914, 0.0, "Open hand, swipe left")),
            ("start_present", dynamic([1, 1, 1, 1, 1], (1, 0), 0.115876, 0.0, "Open hand, swipe right")),
            ("end", held([1, 1, 1, 1, 1], "Hold an open hand")),
            ("home", held([1, 0, 0, 0, 0], "Hold a thumbs-up")),
        ];
        for (label, template) in stock {
            reg.insert(label, template);
        }
        reg
    }

    /// Defaults overlaid with a JSON object of `label -> template`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> GpResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let overrides: BTreeMap<String, GestureTemplate> = serde_json::from_str(&content)?;
        let mut reg = Self::new_with_defaults();
        let count = overrides.len();
        for (label, template) in overrides {
            reg.insert(&label, template);
        }
        info!("Loaded {} gesture templates from {:?}", count, path.as_ref());
        Ok(reg)
    }

    pub fn insert(&mut self, label: &str, template: GestureTemplate) {
        self.templates.insert(normalize(label), template);
    }

    pub fn get(&self, label: &str) -> Option<&GestureTemplate> {
        self.templates.get(&normalize(label))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}
