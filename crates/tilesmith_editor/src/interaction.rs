//! Pointer interaction state machine
//!
//! Turns pointer down/move/up events (in map pixel coordinates) into
//! [`EditAction`]s. The machine never touches the world itself; the session
//! applies the actions it emits.

use tilesmith_core::{Cell, CollisionShape};

/// The active editing tool; at most one is selected
#[derive(Debug, Clone, PartialEq)]
pub enum Tool {
    /// Stamp a catalog pattern onto the selected layer
    Pattern(String),
    /// Paint a collision shape
    Collision(CollisionShape),
    /// Place an entity definition by id
    Entity(String),
    /// Clear cells, or remove entities on the entities layer
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// `current` is the last cell entered; a move within it emits nothing
    Dragging {
        start: Cell,
        current: Cell,
    },
}

/// A single edit requested by the pointer
#[derive(Debug, Clone, PartialEq)]
pub enum EditAction {
    PlacePattern {
        cell: Cell,
        pattern: String,
    },
    PlaceCollision {
        cell: Cell,
        shape: CollisionShape,
    },
    PlaceEntity {
        cell: Cell,
        entity: String,
    },
    /// `x`/`y` is the pointer pixel, used for entity hit-testing
    Delete {
        cell: Cell,
        x: f32,
        y: f32,
    },
    /// Tile the rectangle spanned by two cells with a pattern
    FillRegion {
        from: Cell,
        to: Cell,
        pattern: String,
    },
}

#[derive(Debug, Clone)]
pub struct Interaction {
    tile_size: u32,
    tool: Option<Tool>,
    fill_mode: bool,
    state: DragState,
}

impl Interaction {
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size,
            tool: None,
            fill_mode: false,
            state: DragState::Idle,
        }
    }

    pub fn tool(&self) -> Option<&Tool> {
        self.tool.as_ref()
    }

    pub fn fill_mode(&self) -> bool {
        self.fill_mode
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Replace the active tool. Selecting `Delete` turns fill mode off.
    pub fn select_tool(&mut self, tool: Tool) {
        if tool == Tool::Delete {
            self.fill_mode = false;
        }
        self.tool = Some(tool);
    }

    pub fn clear_tool(&mut self) {
        self.tool = None;
    }

    /// Toggle rectangle fill. Enabling it drops the delete tool.
    pub fn set_fill_mode(&mut self, enabled: bool) {
        if enabled && self.tool == Some(Tool::Delete) {
            self.tool = None;
        }
        self.fill_mode = enabled;
    }

    /// Abort any drag and deselect the tool without emitting anything
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
        self.tool = None;
    }

    /// Abort a drag but keep the tool
    pub fn cancel_drag(&mut self) {
        self.state = DragState::Idle;
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) -> Option<EditAction> {
        let cell = Cell::from_pixel(x, y, self.tile_size);
        self.state = DragState::Dragging {
            start: cell,
            current: cell,
        };
        if self.fill_mode {
            return None;
        }
        self.action_at(cell, x, y)
    }

    /// Emits at most one action per distinct cell entered while dragging
    pub fn pointer_move(&mut self, x: f32, y: f32) -> Option<EditAction> {
        let DragState::Dragging { start, current } = self.state else {
            return None;
        };
        let cell = Cell::from_pixel(x, y, self.tile_size);
        self.state = DragState::Dragging {
            start,
            current: cell,
        };
        if self.fill_mode || cell == current {
            return None;
        }
        self.action_at(cell, x, y)
    }

    /// Ends the drag; in fill mode with a pattern tool this emits the fill
    pub fn pointer_up(&mut self, x: f32, y: f32) -> Option<EditAction> {
        let DragState::Dragging { start, .. } = std::mem::take(&mut self.state) else {
            return None;
        };
        if !self.fill_mode {
            return None;
        }
        match &self.tool {
            Some(Tool::Pattern(pattern)) => Some(EditAction::FillRegion {
                from: start,
                to: Cell::from_pixel(x, y, self.tile_size),
                pattern: pattern.clone(),
            }),
            _ => None,
        }
    }

    fn action_at(&self, cell: Cell, x: f32, y: f32) -> Option<EditAction> {
        let action = match self.tool.as_ref()? {
            Tool::Pattern(pattern) => EditAction::PlacePattern {
                cell,
                pattern: pattern.clone(),
            },
            Tool::Collision(shape) => EditAction::PlaceCollision {
                cell,
                shape: *shape,
            },
            Tool::Entity(entity) => EditAction::PlaceEntity {
                cell,
                entity: entity.clone(),
            },
            Tool::Delete => EditAction::Delete { cell, x, y },
        };
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern_tool() -> Interaction {
        let mut interaction = Interaction::new(8);
        interaction.select_tool(Tool::Pattern("grass".to_string()));
        interaction
    }

    fn place(x: i32, y: i32) -> Option<EditAction> {
        Some(EditAction::PlacePattern {
            cell: Cell::new(x, y),
            pattern: "grass".to_string(),
        })
    }

    #[test]
    fn test_down_fires_for_start_cell() {
        let mut interaction = pattern_tool();
        assert_eq!(interaction.pointer_down(9.0, 17.0), place(1, 2));
        assert!(interaction.is_dragging());
    }

    #[test]
    fn test_move_fires_once_per_cell() {
        let mut interaction = pattern_tool();
        interaction.pointer_down(0.0, 0.0);

        assert_eq!(interaction.pointer_move(3.0, 3.0), None);
        assert_eq!(interaction.pointer_move(8.0, 0.0), place(1, 0));
        assert_eq!(
            interaction.state(),
            DragState::Dragging {
                start: Cell::new(0, 0),
                current: Cell::new(1, 0),
            }
        );
        assert_eq!(interaction.pointer_move(12.0, 7.0), None);
        assert_eq!(interaction.pointer_move(16.0, 0.0), place(2, 0));
        assert_eq!(interaction.pointer_move(8.0, 0.0), place(1, 0));

        assert_eq!(interaction.pointer_up(8.0, 0.0), None);
        assert_eq!(interaction.state(), DragState::Idle);
    }

    #[test]
    fn test_move_without_drag_is_ignored() {
        let mut interaction = pattern_tool();
        assert_eq!(interaction.pointer_move(40.0, 40.0), None);
        assert_eq!(interaction.pointer_up(40.0, 40.0), None);
    }

    #[test]
    fn test_fill_mode_emits_region_on_release() {
        let mut interaction = pattern_tool();
        interaction.set_fill_mode(true);

        assert_eq!(interaction.pointer_down(0.0, 0.0), None);
        assert_eq!(interaction.pointer_move(16.0, 0.0), None);
        assert_eq!(interaction.pointer_move(24.0, 8.0), None);
        assert_eq!(
            interaction.pointer_up(31.0, 15.0),
            Some(EditAction::FillRegion {
                from: Cell::new(0, 0),
                to: Cell::new(3, 1),
                pattern: "grass".to_string(),
            })
        );
    }

    #[test]
    fn test_fill_mode_without_pattern_does_nothing() {
        let mut interaction = Interaction::new(8);
        interaction.select_tool(Tool::Collision(CollisionShape::Full));
        interaction.set_fill_mode(true);

        assert_eq!(interaction.pointer_down(0.0, 0.0), None);
        assert_eq!(interaction.pointer_up(16.0, 16.0), None);
    }

    #[test]
    fn test_delete_and_fill_are_exclusive() {
        let mut interaction = Interaction::new(8);
        interaction.select_tool(Tool::Delete);
        interaction.set_fill_mode(true);
        assert_eq!(interaction.tool(), None);

        interaction.select_tool(Tool::Delete);
        assert!(!interaction.fill_mode());
    }

    #[test]
    fn test_delete_carries_pointer_pixel() {
        let mut interaction = Interaction::new(8);
        interaction.select_tool(Tool::Delete);
        assert_eq!(
            interaction.pointer_down(12.5, 3.0),
            Some(EditAction::Delete {
                cell: Cell::new(1, 0),
                x: 12.5,
                y: 3.0,
            })
        );
    }

    #[test]
    fn test_cancel_aborts_drag() {
        let mut interaction = pattern_tool();
        interaction.set_fill_mode(true);
        interaction.pointer_down(0.0, 0.0);

        interaction.cancel();
        assert_eq!(interaction.pointer_up(16.0, 16.0), None);
        assert_eq!(interaction.tool(), None);
    }

    #[test]
    fn test_no_tool_still_tracks_drag() {
        let mut interaction = Interaction::new(8);
        assert_eq!(interaction.pointer_down(0.0, 0.0), None);
        assert!(interaction.is_dragging());
        assert_eq!(interaction.pointer_move(8.0, 0.0), None);
    }
}
