use std::future::Future;

use crate::{foundation::core::SceneId, transitions::surface::SurfaceRef};

/// Collaborator doing the real work of each lifecycle phase.
///
/// Futures may suspend freely; the lifecycle manager serializes calls per scene, so a stage never
/// sees two phases of the same scene overlap. Timeouts are the stage's responsibility.
pub trait SceneStage {
    /// Fetch and decode whatever the scene needs.
    fn prepare_assets(&self, scene: &SceneId) -> impl Future<Output = anyhow::Result<()>>;

    /// Build the scene's layers on `surface`.
    fn mount_layers(
        &self,
        scene: &SceneId,
        surface: &SurfaceRef,
    ) -> impl Future<Output = anyhow::Result<()>>;

    /// Start media and timelines.
    fn start_playback(&self, scene: &SceneId) -> impl Future<Output = anyhow::Result<()>>;

    /// Tear the layers down.
    fn unmount_layers(&self, scene: &SceneId) -> impl Future<Output = anyhow::Result<()>>;

    /// Drop cached assets and any other resources.
    fn release_resources(&self, scene: &SceneId) -> impl Future<Output = anyhow::Result<()>>;
}
