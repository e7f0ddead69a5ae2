use tracing::warn;

use super::entity::EntityId;

/// One z-order bucket of drawable entities.
///
/// `fixed` is locked by the first entity inserted with this index; later
/// inserts that disagree keep the layer's flag and log a warning.
#[derive(Debug, Clone)]
pub struct Layer {
    pub index: i32,
    pub fixed: bool,
    entries: Vec<LayerEntry>,
}

#[derive(Debug, Clone, Copy)]
struct LayerEntry {
    priority: i32,
    entity: EntityId,
}

impl Layer {
    fn new(index: i32, fixed: bool) -> Self {
        Self {
            index,
            fixed,
            entries: Vec::new(),
        }
    }

    fn insert(&mut self, entity: EntityId, priority: i32) {
        self.entries.push(LayerEntry { priority, entity });
        // Stable sort: equal priorities keep insertion order.
        self.entries.sort_by_key(|entry| entry.priority);
    }

    fn remove(&mut self, entity: EntityId) {
        self.entries.retain(|entry| entry.entity != entity);
    }

    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entries.iter().map(|entry| entry.entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All layers of a scene, kept in ascending index order. Iterating the set
/// yields the global draw order: ascending `(layer, priority)` with ties in
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct LayerSet {
    layers: Vec<Layer>,
}

impl LayerSet {
    pub fn insert(&mut self, entity: EntityId, index: i32, priority: i32, fixed: bool) {
        let slot = match self.layers.binary_search_by_key(&index, |layer| layer.index) {
            Ok(slot) => {
                let layer = &self.layers[slot];
                if layer.fixed != fixed {
                    warn!(
                        layer = index,
                        layer_fixed = layer.fixed,
                        entity_fixed = fixed,
                        "layer_fixed_mismatch"
                    );
                }
                slot
            }
            Err(slot) => {
                self.layers.insert(slot, Layer::new(index, fixed));
                slot
            }
        };
        self.layers[slot].insert(entity, priority);
    }

    pub fn remove(&mut self, entity: EntityId) {
        for layer in &mut self.layers {
            layer.remove(entity);
        }
        self.layers.retain(|layer| !layer.is_empty());
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Flattened draw order across all layers.
    pub fn draw_order(&self) -> Vec<EntityId> {
        self.layers
            .iter()
            .flat_map(|layer| layer.entities())
            .collect()
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_has_empty_draw_order() {
        let set = LayerSet::default();
        assert!(set.draw_order().is_empty());
    }

    #[test]
    fn single_entity_draws_alone() {
        let mut set = LayerSet::default();
        set.insert(EntityId(1), 0, 0, false);
        assert_eq!(set.draw_order(), vec![EntityId(1)]);
    }

    #[test]
    fn draw_order_is_stable_sort_by_layer_then_priority() {
        let mut set = LayerSet::default();
        // Inserted out of order on purpose.
        set.insert(EntityId(1), 10, 100, false);
        set.insert(EntityId(2), 1, 5, false);
        set.insert(EntityId(3), 1, 0, false);
        set.insert(EntityId(4), 10, 100, false); // ties with 1 by insertion order
        set.insert(EntityId(5), 1, 5, false); // ties with 2 by insertion order
        set.insert(EntityId(6), 20, 0, true);

        assert_eq!(
            set.draw_order(),
            vec![
                EntityId(3),
                EntityId(2),
                EntityId(5),
                EntityId(1),
                EntityId(4),
                EntityId(6),
            ]
        );
    }

    #[test]
    fn draw_order_matches_reference_stable_sort_for_random_pairs() {
        // Fixed pseudo-random (layer, priority) pairs; the read-back order
        // must equal a stable sort keyed on (layer, priority).
        let pairs: [(i32, i32); 12] = [
            (3, 7),
            (1, 2),
            (3, 7),
            (0, 9),
            (2, 1),
            (1, 2),
            (0, 0),
            (2, 1),
            (3, 0),
            (1, 8),
            (0, 9),
            (2, 5),
        ];
        let mut set = LayerSet::default();
        for (id, (layer, priority)) in pairs.iter().enumerate() {
            set.insert(EntityId(id as u64), *layer, *priority, false);
        }

        let mut expected: Vec<(i32, i32, u64)> = pairs
            .iter()
            .enumerate()
            .map(|(id, (layer, priority))| (*layer, *priority, id as u64))
            .collect();
        expected.sort_by_key(|(layer, priority, _)| (*layer, *priority));

        let actual: Vec<u64> = set.draw_order().iter().map(|id| id.0).collect();
        let expected_ids: Vec<u64> = expected.iter().map(|(_, _, id)| *id).collect();
        assert_eq!(actual, expected_ids);
    }

    #[test]
    fn fixed_flag_comes_from_first_insert() {
        let mut set = LayerSet::default();
        set.insert(EntityId(1), 5, 0, true);
        set.insert(EntityId(2), 5, 1, false); // mismatch: layer stays fixed
        let layer = &set.layers()[0];
        assert!(layer.fixed);
        assert_eq!(layer.len(), 2);
    }

    #[test]
    fn remove_drops_entity_and_empty_layers() {
        let mut set = LayerSet::default();
        set.insert(EntityId(1), 0, 0, false);
        set.insert(EntityId(2), 1, 0, false);
        set.remove(EntityId(1));
        assert_eq!(set.layers().len(), 1);
        assert_eq!(set.draw_order(), vec![EntityId(2)]);
    }

    #[test]
    fn reinsert_after_remove_uses_current_priority() {
        let mut set = LayerSet::default();
        set.insert(EntityId(1), 0, 10, false);
        set.insert(EntityId(2), 0, 20, false);
        set.remove(EntityId(1));
        set.insert(EntityId(1), 0, 30, false);
        assert_eq!(set.draw_order(), vec![EntityId(2), EntityId(1)]);
    }
}
