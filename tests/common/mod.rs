//! Shared fixtures for the integration tests: an in-memory scene, a fake
//! converter script and an extracted-assets tree.

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use dos2de_importer::models::ColladaSettings;
use dos2de_importer::services::{
    MaterialId, ObjectId, ObjectKind, Scene, SceneError, SceneObject, TextureSet, TransformFlags,
};
use std::collections::{HashMap, HashSet};
use std::fs;
use tempfile::TempDir;

/// An object the scene importer creates when it sees a given Collada file.
#[derive(Debug, Clone)]
pub struct Blueprint {
    pub name: String,
    pub kind: ObjectKind,
    /// Index of the parent within the same import
    pub parent: Option<usize>,
    pub has_action: bool,
}

impl Blueprint {
    pub fn armature(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ObjectKind::Armature,
            parent: None,
            has_action: false,
        }
    }

    pub fn mesh(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ObjectKind::Mesh,
            parent: None,
            has_action: false,
        }
    }

    pub fn child_of(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_action(mut self) -> Self {
        self.has_action = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct MemoryObject {
    pub id: ObjectId,
    pub name: String,
    pub data_name: String,
    pub kind: ObjectKind,
    pub parent: Option<ObjectId>,
    pub action: Option<String>,
    pub fake_user: bool,
    pub keyframe_offset: f32,
    pub transforms_applied: bool,
    pub materials: Vec<MaterialId>,
}

#[derive(Debug, Clone)]
pub struct MemoryMaterial {
    pub id: MaterialId,
    pub name: String,
    pub textures: TextureSet,
}

/// Scene double keeping everything in vectors.
///
/// What an import creates is scripted per Collada file name with
/// [`MemoryScene::on_import`]. Failures are injected by object name.
#[derive(Debug, Default)]
pub struct MemoryScene {
    pub objects: Vec<MemoryObject>,
    pub materials: Vec<MemoryMaterial>,
    pub active: Option<ObjectId>,
    pub imported: Vec<Utf8PathBuf>,
    pub applied: Vec<ObjectId>,
    pub fail_import: bool,
    pub fail_transforms: HashSet<String>,
    pub fail_renames: HashSet<String>,
    next_id: u64,
    next_material: u64,
    blueprints: HashMap<String, Vec<Blueprint>>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the objects created when a Collada file named `file_name` is imported.
    pub fn on_import(&mut self, file_name: &str, blueprints: Vec<Blueprint>) {
        self.blueprints.insert(file_name.to_string(), blueprints);
    }

    /// Add an object that exists before any import.
    pub fn add_existing(&mut self, name: &str, kind: ObjectKind) -> ObjectId {
        self.spawn(name, kind, None, false)
    }

    pub fn add_material(&mut self, name: &str) -> MaterialId {
        self.next_material += 1;
        let id = MaterialId(self.next_material);
        self.materials.push(MemoryMaterial {
            id,
            name: name.to_string(),
            textures: TextureSet::default(),
        });
        id
    }

    pub fn find(&self, name: &str) -> Option<&MemoryObject> {
        self.objects.iter().find(|obj| obj.name == name)
    }

    pub fn get(&self, id: ObjectId) -> Option<&MemoryObject> {
        self.objects.iter().find(|obj| obj.id == id)
    }

    pub fn names(&self) -> Vec<String> {
        self.objects.iter().map(|obj| obj.name.clone()).collect()
    }

    fn get_mut(&mut self, id: ObjectId) -> Result<&mut MemoryObject, SceneError> {
        self.objects
            .iter_mut()
            .find(|obj| obj.id == id)
            .ok_or(SceneError::ObjectNotFound(id))
    }

    fn spawn(&mut self, name: &str, kind: ObjectKind, parent: Option<ObjectId>, has_action: bool) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        self.objects.push(MemoryObject {
            id,
            name: name.to_string(),
            data_name: name.to_string(),
            kind,
            parent,
            action: has_action.then(|| format!("{name}Action")),
            fake_user: false,
            keyframe_offset: 0.0,
            transforms_applied: false,
            materials: Vec::new(),
        });
        id
    }
}

impl Scene for MemoryScene {
    fn object_ids(&self) -> Vec<ObjectId> {
        self.objects.iter().map(|obj| obj.id).collect()
    }

    fn object(&self, id: ObjectId) -> Option<SceneObject> {
        self.get(id).map(|obj| SceneObject {
            id: obj.id,
            name: obj.name.clone(),
            kind: obj.kind,
            parent: obj.parent,
            has_action: obj.action.is_some(),
        })
    }

    fn children(&self, id: ObjectId) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|obj| obj.parent == Some(id))
            .map(|obj| obj.id)
            .collect()
    }

    fn import_collada(&mut self, path: &Utf8Path, _settings: &ColladaSettings) -> Result<(), SceneError> {
        if self.fail_import {
            return Err(SceneError::ImportFailed(format!("cannot read {path}")));
        }
        if !path.is_file() {
            return Err(SceneError::ImportFailed(format!("{path} does not exist")));
        }
        self.imported.push(path.to_path_buf());

        let file_name = path.file_name().unwrap_or_default().to_string();
        let blueprints = self.blueprints.get(&file_name).cloned().unwrap_or_default();

        let mut created: Vec<ObjectId> = Vec::new();
        for blueprint in blueprints {
            let parent = blueprint.parent.map(|index| created[index]);
            let id = self.spawn(&blueprint.name, blueprint.kind, parent, blueprint.has_action);
            created.push(id);
        }
        Ok(())
    }

    fn data_names(&self, kind: ObjectKind, except: Option<ObjectId>) -> Vec<String> {
        self.objects
            .iter()
            .filter(|obj| obj.kind == kind && Some(obj.id) != except)
            .map(|obj| obj.data_name.clone())
            .collect()
    }

    fn rename(&mut self, id: ObjectId, name: &str) -> Result<(), SceneError> {
        if self.fail_renames.contains(name) {
            return Err(SceneError::Operation(format!("cannot rename to {name}")));
        }
        let obj = self.get_mut(id)?;
        obj.name = name.to_string();
        obj.data_name = name.to_string();
        Ok(())
    }

    fn rename_action(&mut self, id: ObjectId, name: &str) -> Result<(), SceneError> {
        let obj = self.get_mut(id)?;
        match obj.action.as_mut() {
            Some(action) => {
                *action = name.to_string();
                Ok(())
            }
            None => Err(SceneError::NoAction(id)),
        }
    }

    fn set_action_fake_user(&mut self, id: ObjectId) -> Result<(), SceneError> {
        let obj = self.get_mut(id)?;
        if obj.action.is_none() {
            return Err(SceneError::NoAction(id));
        }
        obj.fake_user = true;
        Ok(())
    }

    fn offset_action_keyframes(&mut self, id: ObjectId, frames: f32) -> Result<(), SceneError> {
        let obj = self.get_mut(id)?;
        if obj.action.is_none() {
            return Err(SceneError::NoAction(id));
        }
        obj.keyframe_offset += frames;
        Ok(())
    }

    fn active_object(&self) -> Option<ObjectId> {
        self.active
    }

    fn set_active_object(&mut self, id: Option<ObjectId>) {
        self.active = id;
    }

    fn apply_transforms(&mut self, id: ObjectId, _flags: TransformFlags) -> Result<(), SceneError> {
        self.applied.push(id);
        // Baking selects the object
        self.active = Some(id);
        let fail = self
            .get(id)
            .is_some_and(|obj| self.fail_transforms.contains(&obj.name));
        let obj = self.get_mut(id)?;
        if fail {
            return Err(SceneError::Operation(format!("cannot apply transforms to {}", obj.name)));
        }
        obj.transforms_applied = true;
        Ok(())
    }

    fn delete_object(&mut self, id: ObjectId) -> Result<(), SceneError> {
        let index = self
            .objects
            .iter()
            .position(|obj| obj.id == id)
            .ok_or(SceneError::ObjectNotFound(id))?;
        self.objects.remove(index);
        for obj in &mut self.objects {
            if obj.parent == Some(id) {
                obj.parent = None;
            }
        }
        Ok(())
    }

    fn find_material(&self, name: &str) -> Option<MaterialId> {
        self.materials
            .iter()
            .find(|material| material.name == name)
            .map(|material| material.id)
    }

    fn create_pbr_material(&mut self, name: &str, textures: &TextureSet) -> Result<MaterialId, SceneError> {
        self.next_material += 1;
        let id = MaterialId(self.next_material);
        self.materials.push(MemoryMaterial {
            id,
            name: name.to_string(),
            textures: textures.clone(),
        });
        Ok(id)
    }

    fn attach_material(&mut self, id: ObjectId, material: MaterialId) -> Result<(), SceneError> {
        self.get_mut(id)?.materials.push(material);
        Ok(())
    }
}

/// A temp directory as a UTF-8 path. Keep the `TempDir` alive.
pub fn utf8_temp_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, path)
}

/// Create `path` (and its parent directories) with some content.
pub fn touch(path: &Utf8Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"data").unwrap();
}

/// Lay out `<root>/Characters/<Race>/<Race>_<Gender>_Base.gr2` for each key.
pub fn write_skeletons(root: &Utf8Path, keys: &[&str]) -> Vec<Utf8PathBuf> {
    keys.iter()
        .map(|key| {
            let race = key.split('_').next().unwrap();
            let path = root
                .join("Characters")
                .join(race)
                .join(format!("{key}_Base.gr2"));
            touch(&path);
            path
        })
        .collect()
}

/// Create texture files under `<root>/Textures/Characters/<Race>/<Race>_<Gender>/`.
pub fn write_textures(root: &Utf8Path, key: &str, file_names: &[&str]) -> Utf8PathBuf {
    let race = key.split('_').next().unwrap();
    let dir = root.join("Textures").join("Characters").join(race).join(key);
    fs::create_dir_all(&dir).unwrap();
    for file_name in file_names {
        touch(&dir.join(file_name));
    }
    dir
}

/// Write a stand-in for divine.exe into `dir`.
///
/// On success it writes the `-d` destination; either way it records its
/// arguments one per line in `args.txt` next to itself.
#[cfg(unix)]
pub fn write_converter(dir: &Utf8Path, exit_code: i32) -> Utf8PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("divine.sh");
    let body = if exit_code == 0 {
        r#"dest=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-d" ]; then dest="$2"; fi
  shift
done
echo "Converting model"
printf 'collada' > "$dest"
echo "Export completed successfully"
"#
        .to_string()
    } else {
        format!("echo \"Loading model\"\necho \"Invalid Granny file\"\nexit {exit_code}\n")
    };

    let script_text = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$@\" > \"$(dirname \"$0\")/args.txt\"\n{body}"
    );
    fs::write(&script, script_text).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

/// Arguments the fake converter was last called with.
pub fn converter_args(dir: &Utf8Path) -> Vec<String> {
    fs::read_to_string(dir.join("args.txt"))
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}
