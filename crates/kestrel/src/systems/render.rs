//! Render preparation.
//!
//! There is no GPU backend here. The system produces the per-frame list of
//! draw commands a backend would consume, as plain bytes ready for upload.

use bytemuck::{Pod, Zeroable};
use kestrel_core::{ComponentView, EcsResult, EntitySet, System};

use crate::components::{Mesh, Transform};

/// One mesh instance to draw.
///
/// Layout is fixed (`repr(C)`, 48 bytes) so a list of them can be uploaded
/// as an instance buffer without conversion.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DrawCommand {
    /// World transform of the instance.
    pub transform: Transform,
    /// Mesh id in the backend's resource table.
    pub mesh_id: u32,
    /// Material id in the backend's resource table.
    pub material_id: u32,
    /// Raw id of the entity that produced this command.
    pub entity: u32,
}

/// Draw commands for one frame, in tracked-entity order.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    /// Number of commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True when nothing is drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The commands.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Returns commands as bytes for GPU upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.commands)
    }

    fn clear(&mut self) {
        self.commands.clear();
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

/// Builds a [`DrawList`] from every entity with a [`Transform`] and a [`Mesh`].
///
/// The list is rebuilt from scratch on each update, so it always reflects
/// the transforms as they were after that frame's physics.
#[derive(Debug, Clone, Default)]
pub struct RenderSystem {
    draw_list: DrawList,
}

impl RenderSystem {
    /// The list built by the last update.
    #[must_use]
    pub fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }
}

impl System for RenderSystem {
    fn update(
        &mut self,
        view: &mut ComponentView<'_>,
        entities: &EntitySet,
        _delta_seconds: f64,
    ) -> EcsResult<()> {
        self.draw_list.clear();
        for &entity in entities {
            let transform = *view.get::<Transform>(entity)?;
            let mesh = *view.get::<Mesh>(entity)?;
            self.draw_list.push(DrawCommand {
                transform,
                mesh_id: mesh.mesh_id,
                material_id: mesh.material_id,
                entity: entity.id(),
            });
        }
        tracing::trace!(commands = self.draw_list.len(), "draw list rebuilt");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "render"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::register_components;
    use crate::math::Vec3;
    use kestrel_core::{Coordinator, Signature};

    fn setup() -> Coordinator {
        let mut ecs = Coordinator::with_capacity(8);
        register_components(&mut ecs).unwrap();
        ecs.register_system::<RenderSystem>().unwrap();

        let required: Signature = [
            ecs.component_type::<Transform>().unwrap(),
            ecs.component_type::<Mesh>().unwrap(),
        ]
        .into_iter()
        .collect();
        ecs.set_system_signature::<RenderSystem>(required).unwrap();
        ecs
    }

    #[test]
    fn test_draw_command_layout() {
        assert_eq!(std::mem::size_of::<DrawCommand>(), 48);

        let mut list = DrawList::default();
        list.push(DrawCommand::default());
        list.push(DrawCommand::default());
        assert_eq!(list.as_bytes().len(), 96);
    }

    #[test]
    fn test_draw_list_follows_meshes() {
        let mut ecs = setup();

        let a = ecs.create_entity().unwrap();
        ecs.add_component(a, Transform::at(Vec3::new(1.0, 2.0, 3.0))).unwrap();
        ecs.add_component(a, Mesh { mesh_id: 7, material_id: 2 }).unwrap();

        let b = ecs.create_entity().unwrap();
        ecs.add_component(b, Transform::default()).unwrap();

        ecs.run_system::<RenderSystem>(0.0).unwrap();
        let list = ecs.system::<RenderSystem>().unwrap().draw_list();
        assert_eq!(list.len(), 1);
        assert_eq!(list.commands()[0].entity, a.id());
        assert_eq!(list.commands()[0].mesh_id, 7);
        assert_eq!(list.commands()[0].transform.position, Vec3::new(1.0, 2.0, 3.0));

        ecs.add_component(b, Mesh::default()).unwrap();
        ecs.remove_component::<Mesh>(a).unwrap();

        ecs.run_system::<RenderSystem>(0.0).unwrap();
        let list = ecs.system::<RenderSystem>().unwrap().draw_list();
        assert_eq!(list.len(), 1);
        assert_eq!(list.commands()[0].entity, b.id());
    }

    #[test]
    fn test_empty_world_draws_nothing() {
        let mut ecs = setup();
        ecs.run_system::<RenderSystem>(0.0).unwrap();

        let list = ecs.system::<RenderSystem>().unwrap().draw_list();
        assert!(list.is_empty());
        assert!(list.as_bytes().is_empty());
    }
}
