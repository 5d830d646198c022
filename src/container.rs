//! The shared parent node holding every toast for one container identifier.

use tracing::warn;

use crate::config::Settings;
use crate::surface::{Insert, NodeId, NodeSpec, RenderSurface};

/// Look up the container for `settings.container_id`, creating it under
/// `settings.target` when asked to.
///
/// A missing target is logged and yields `None`; nothing can be shown until
/// the target exists.
pub fn get<S>(surface: &mut S, settings: &Settings, create_if_missing: bool) -> Option<NodeId>
where
    S: RenderSurface + ?Sized,
{
    if let Some(existing) = surface.find_by_id(&settings.container_id) {
        return Some(existing);
    }
    if !create_if_missing {
        return None;
    }
    let Some(target) = surface.find_target(&settings.target) else {
        warn!(
            target_selector = %settings.target,
            container_id = %settings.container_id,
            "toast container target not found"
        );
        return None;
    };

    let container = surface.create(NodeSpec {
        id: Some(settings.container_id.clone()),
        classes: vec![settings.position_class.clone()],
        ..NodeSpec::default()
    });
    surface.insert(target, container, Insert::Back);
    Some(container)
}

/// Detach `child` from `container` and destroy the container when that
/// leaves it empty. Returns `true` when the container was destroyed.
pub fn remove_child<S>(surface: &mut S, container: NodeId, child: NodeId) -> bool
where
    S: RenderSurface + ?Sized,
{
    if surface.parent(child) == Some(container) {
        surface.detach(child);
    }
    if surface.children(container).is_empty() {
        surface.destroy(container);
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::{get, remove_child};
    use crate::config::Settings;
    use crate::surface::headless::HeadlessSurface;
    use crate::surface::{Insert, NodeSpec, RenderSurface};

    #[test]
    fn container_is_created_once_and_tagged_with_position() {
        let mut surface = HeadlessSurface::new();
        let settings = Settings::default();

        assert_eq!(get(&mut surface, &settings, false), None);
        let Some(created) = get(&mut surface, &settings, true) else {
            panic!("container should be created under body");
        };
        assert_eq!(get(&mut surface, &settings, true), Some(created));
        assert!(
            surface
                .node(created)
                .is_some_and(|n| n.has_class("toast-top-right"))
        );
        assert_eq!(surface.parent(created), Some(surface.root()));
    }

    #[test]
    fn missing_target_leaves_no_container() {
        let mut surface = HeadlessSurface::new();
        let settings = Settings {
            target: "#missing".to_string(),
            ..Settings::default()
        };
        assert_eq!(get(&mut surface, &settings, true), None);
    }

    #[test]
    fn last_child_removal_destroys_the_container() {
        let mut surface = HeadlessSurface::new();
        let Some(container) = get(&mut surface, &Settings::default(), true) else {
            panic!("container should be created");
        };
        let first = surface.create(NodeSpec::default());
        let second = surface.create(NodeSpec::default());
        surface.insert(container, first, Insert::Back);
        surface.insert(container, second, Insert::Back);

        assert!(!remove_child(&mut surface, container, first));
        assert!(surface.is_attached(container));
        assert!(remove_child(&mut surface, container, second));
        assert!(!surface.is_attached(container));
        assert!(surface.node(container).is_none());
    }
}
