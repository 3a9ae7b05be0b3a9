//! Courier body state.
//!
//! A [`CourierBody`] is the physical side of a courier: where it stands,
//! how big it is, what it carries, and the label painted on it. The
//! transport behavior reads and mutates it through [`StepContext`].
//!
//! [`StepContext`]: crate::transport::StepContext

use haulage_types::{Aabb, AgentId, ItemStack, Vec3};

/// Default courier body width in world units.
pub const DEFAULT_WIDTH: f64 = 0.6;

/// Default courier body height in world units.
pub const DEFAULT_HEIGHT: f64 = 0.9;

/// Physical state of a courier agent.
#[derive(Debug, Clone, PartialEq)]
pub struct CourierBody {
    /// Stable identity of the courier.
    pub id: AgentId,
    /// Position of the courier's feet.
    pub pos: Vec3,
    /// Body width (x and z extent).
    pub width: f64,
    /// Body height (y extent).
    pub height: f64,
    /// Label painted on the courier; drives its pickup filter.
    pub label: Option<String>,
    /// The stack held in hand, if any.
    pub hand: Option<ItemStack>,
    /// Whether the courier is currently being carried by something else.
    ///
    /// Carried couriers search only their immediate surroundings.
    pub carried: bool,
}

impl CourierBody {
    /// Create a courier of default size at the given position.
    pub const fn new(id: AgentId, pos: Vec3) -> Self {
        Self {
            id,
            pos,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            label: None,
            hand: None,
            carried: false,
        }
    }

    /// The point at the middle of the courier's body.
    pub fn center(&self) -> Vec3 {
        self.pos.offset(0.0, self.height / 2.0, 0.0)
    }

    /// The courier's bounding box at its current position.
    pub fn bounding_box(&self) -> Aabb {
        Aabb::of_size(self.center(), self.width, self.height, self.width)
    }

    /// Whether the courier's hand is empty.
    pub fn is_empty_handed(&self) -> bool {
        self.hand.as_ref().is_none_or(ItemStack::is_empty)
    }

    /// The courier's filter label, if it carries a non-empty one.
    pub fn filter_label(&self) -> Option<&str> {
        self.label.as_deref().filter(|label| !label.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use haulage_types::ItemId;

    use super::*;

    #[test]
    fn center_is_half_height_above_feet() {
        let body = CourierBody::new(AgentId::new(), Vec3::new(1.0, 2.0, 3.0));
        let center = body.center();
        assert!((center.y - 2.45).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_hand_detection() {
        let mut body = CourierBody::new(AgentId::new(), Vec3::new(0.0, 0.0, 0.0));
        assert!(body.is_empty_handed());
        body.hand = Some(ItemStack::new(ItemId::new("iron_ingot"), 0));
        assert!(body.is_empty_handed());
        body.hand = Some(ItemStack::new(ItemId::new("iron_ingot"), 1));
        assert!(!body.is_empty_handed());
    }

    #[test]
    fn blank_label_is_no_filter_label() {
        let mut body = CourierBody::new(AgentId::new(), Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(body.filter_label(), None);
        body.label = Some(String::new());
        assert_eq!(body.filter_label(), None);
        body.label = Some(String::from("iron !nugget"));
        assert_eq!(body.filter_label(), Some("iron !nugget"));
    }
}
