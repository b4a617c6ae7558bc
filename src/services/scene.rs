//! The host scene editor, seen from the import pipeline.
//!
//! The pipeline never touches scene internals directly. Everything it needs
//! (the Collada import primitive, object enumeration, renames, transform
//! baking, material plumbing) goes through the [`Scene`] trait, which the
//! host implements.

use crate::models::ColladaSettings;
use crate::services::textures::TextureSet;
use camino::Utf8Path;
use std::fmt;
use std::ops::{Deref, DerefMut};
use thiserror::Error;

/// Stable identity of a scene object.
///
/// New objects are found by diffing identity snapshots taken before and
/// after an import, never by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u64);

/// Object kinds the pipeline distinguishes. Meshes and armatures have
/// separate data-block namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Mesh,
    Armature,
    Other,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Mesh => f.write_str("MESH"),
            ObjectKind::Armature => f.write_str("ARMATURE"),
            ObjectKind::Other => f.write_str("OTHER"),
        }
    }
}

/// Snapshot of one scene object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub kind: ObjectKind,
    pub parent: Option<ObjectId>,
    /// The object has animation data with an assigned action
    pub has_action: bool,
}

/// Which transform channels to bake into the object data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformFlags {
    pub location: bool,
    pub rotation: bool,
    pub scale: bool,
}

impl TransformFlags {
    pub const ALL: TransformFlags = TransformFlags {
        location: true,
        rotation: true,
        scale: true,
    };
}

/// Failure reported by the host scene.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("Object {0} not found")]
    ObjectNotFound(ObjectId),

    #[error("Object {0} has no action")]
    NoAction(ObjectId),

    #[error("Collada import failed: {0}")]
    ImportFailed(String),

    #[error("{0}")]
    Operation(String),
}

/// Operations the import pipeline needs from the host scene.
///
/// Object lists are returned in scene order; the pipeline keeps that order
/// when it walks new objects.
#[cfg_attr(test, mockall::automock)]
pub trait Scene {
    /// Identities of every object currently in the scene.
    fn object_ids(&self) -> Vec<ObjectId>;

    fn object(&self, id: ObjectId) -> Option<SceneObject>;

    /// Direct children of an object.
    fn children(&self, id: ObjectId) -> Vec<ObjectId>;

    /// Run the Collada import primitive. Treated as atomic.
    fn import_collada(&mut self, path: &Utf8Path, settings: &ColladaSettings) -> Result<(), SceneError>;

    /// Names of the data blocks of `kind`, leaving out the data owned by `except`.
    fn data_names(&self, kind: ObjectKind, except: Option<ObjectId>) -> Vec<String>;

    /// Rename an object and its data block to the same name.
    fn rename(&mut self, id: ObjectId, name: &str) -> Result<(), SceneError>;

    fn rename_action(&mut self, id: ObjectId, name: &str) -> Result<(), SceneError>;

    /// Mark the object's action as kept even without users.
    fn set_action_fake_user(&mut self, id: ObjectId) -> Result<(), SceneError>;

    /// Shift every keyframe of the object's action by `frames`.
    fn offset_action_keyframes(&mut self, id: ObjectId, frames: f32) -> Result<(), SceneError>;

    fn active_object(&self) -> Option<ObjectId>;

    fn set_active_object(&mut self, id: Option<ObjectId>);

    /// Bake the transform channels into the object. May change the active object.
    fn apply_transforms(&mut self, id: ObjectId, flags: TransformFlags) -> Result<(), SceneError>;

    fn delete_object(&mut self, id: ObjectId) -> Result<(), SceneError>;

    fn find_material(&self, name: &str) -> Option<MaterialId>;

    /// Build a PBR material wired to the given textures.
    fn create_pbr_material(&mut self, name: &str, textures: &TextureSet) -> Result<MaterialId, SceneError>;

    fn attach_material(&mut self, id: ObjectId, material: MaterialId) -> Result<(), SceneError>;
}

/// Restores the scene's active object when dropped.
///
/// Steps that change the active object (transform baking, a whole batch) hold
/// one of these for their duration, so the caller's active object comes back
/// on every exit path, failures included.
pub struct ActiveObjectGuard<'a, S: Scene + ?Sized> {
    scene: &'a mut S,
    previous: Option<ObjectId>,
}

impl<'a, S: Scene + ?Sized> ActiveObjectGuard<'a, S> {
    pub fn new(scene: &'a mut S) -> Self {
        let previous = scene.active_object();
        Self { scene, previous }
    }

    /// The active object that will be restored.
    pub fn previous(&self) -> Option<ObjectId> {
        self.previous
    }
}

impl<S: Scene + ?Sized> Deref for ActiveObjectGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.scene
    }
}

impl<S: Scene + ?Sized> DerefMut for ActiveObjectGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.scene
    }
}

impl<S: Scene + ?Sized> Drop for ActiveObjectGuard<'_, S> {
    fn drop(&mut self) {
        self.scene.set_active_object(self.previous);
    }
}
