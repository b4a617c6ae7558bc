//! Import orchestration.
//!
//! One file goes through `Start → Convert (gr2 only) → SceneImport → PostProcess → Done`:
//!
//! 1. **Start**: the format is decided once from the extension. Granny files
//!    need a converter executable that exists.
//! 2. **Convert**: a base skeleton is resolved from the [`SkeletonCatalog`]
//!    and the file is converted to a temporary Collada file next to it.
//! 3. **SceneImport**: object identities are snapshotted before and after the
//!    scene's Collada importer runs; the difference is the new-object set.
//! 4. **PostProcess**: actions, transforms, deletion, renaming and materials,
//!    in that order, on new objects only. Every sub-step is recorded in the
//!    [`ImportReport`]; failures are logged and never abort the import.
//! 5. **Done**: the temporary Collada file is removed if asked to and nothing
//!    failed.
//!
//! Errors before the scene import are returned as [`ImportError`]. A batch
//! keeps going past failed files.

use crate::metrics::ImportMetrics;
use crate::models::{
    ConformMode, DeleteFilter, FileStatus, ImportFormat, ImportOptions, Preferences, RenameMode,
};
use crate::services::converter::{ConversionError, ConversionOutput, DivineConverter};
use crate::services::naming::{NameRegistry, candidate_name};
use crate::services::scene::{
    ActiveObjectGuard, ObjectId, ObjectKind, Scene, SceneError, TransformFlags,
};
use crate::services::skeletons::SkeletonCatalog;
use crate::services::textures::{TextureResolver, TextureSet};
use crate::state::StateManager;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::sync::Arc;
use thiserror::Error;

/// Suffix of the material built for a mesh.
pub const MATERIAL_SUFFIX: &str = "_DOS2DE_PBR";

/// Frames added to every keyframe so animations start at frame 1.
const ACTION_FRAME_OFFSET: f32 = 1.0;

/// Errors that stop the import of a file
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Unknown extension: {0}")]
    UnknownExtension(Utf8PathBuf),

    #[error("Failed to find divine.exe at path: '{path}'. Canceling GR2 import.")]
    ConverterNotFound { path: String },

    #[error("Error converting GR2 to DAE: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Collada import failed: {0}")]
    SceneImport(#[from] SceneError),
}

impl ImportError {
    /// Errors worth putting in front of the user rather than only in the log.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ImportError::ConverterNotFound { .. } | ImportError::Conversion(_)
        )
    }
}

/// A post-processing sub-step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcessStep {
    RenameAction,
    ActionFakeUser,
    OffsetAction,
    ApplyTransforms,
    Delete,
    Rename,
    Material,
}

impl fmt::Display for PostProcessStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PostProcessStep::RenameAction => "rename action",
            PostProcessStep::ActionFakeUser => "set action fake user",
            PostProcessStep::OffsetAction => "offset action keyframes",
            PostProcessStep::ApplyTransforms => "apply transforms",
            PostProcessStep::Delete => "delete object",
            PostProcessStep::Rename => "rename object",
            PostProcessStep::Material => "assign material",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded,
    Failed { message: String },
}

/// Result of one post-processing sub-step on one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: PostProcessStep,
    pub target: ObjectId,
    pub outcome: StepOutcome,
}

impl StepReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, StepOutcome::Failed { .. })
    }
}

/// Everything that happened to one file that made it into the scene
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub source: Utf8PathBuf,
    pub format: ImportFormat,
    /// Set for Granny files
    pub conversion: Option<ConversionOutput>,
    /// Objects created by the scene import, in scene order
    pub new_objects: Vec<ObjectId>,
    pub steps: Vec<StepReport>,
    pub temp_removed: bool,
}

impl ImportReport {
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|step| step.is_failure())
    }

    pub fn has_failures(&self) -> bool {
        self.steps.iter().any(StepReport::is_failure)
    }

    /// Successful steps of one kind
    pub fn succeeded(&self, step: PostProcessStep) -> usize {
        self.steps
            .iter()
            .filter(|report| report.step == step && !report.is_failure())
            .count()
    }
}

/// Outcome of one file in a batch
#[derive(Debug)]
pub struct FileOutcome {
    pub source: Utf8PathBuf,
    pub result: Result<ImportReport, ImportError>,
}

/// Outcomes of a batch, in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn imported(&self) -> impl Iterator<Item = &ImportReport> {
        self.files.iter().filter_map(|file| file.result.as_ref().ok())
    }

    pub fn failed_count(&self) -> usize {
        self.files.iter().filter(|file| file.result.is_err()).count()
    }

    /// Messages for the failures the user should see
    pub fn user_reports(&self) -> Vec<String> {
        self.files
            .iter()
            .filter_map(|file| match &file.result {
                Err(e) if e.is_user_facing() => Some(format!("{}: {}", file.source, e)),
                _ => None,
            })
            .collect()
    }
}

/// A file after Start and Convert, ready for the scene import
#[derive(Debug, Clone)]
pub struct PreparedImport {
    pub source: Utf8PathBuf,
    pub format: ImportFormat,
    /// The file handed to the scene: the source itself or the temp conversion
    pub collada_path: Utf8PathBuf,
    pub conversion: Option<ConversionOutput>,
}

/// Base name used for file-based renames and texture lookup.
///
/// The file name up to its first `.`, with any `-temp` marker removed:
/// `anims/Humans_Male_Walk.gr2` gives `Humans_Male_Walk`.
pub fn source_base_name(source: &Utf8Path) -> String {
    let file_name = source.file_name().unwrap_or(source.as_str()).replace("-temp", "");
    match file_name.split_once('.') {
        Some((base, _)) => base.to_string(),
        None => file_name,
    }
}

/// Name given to imported actions: the source file stem, without `-temp`.
pub fn action_name(source: &Utf8Path) -> String {
    source.file_stem().unwrap_or_default().replace("-temp", "")
}

/// Drives imports of Collada and Granny files into a [`Scene`].
pub struct Importer<'a> {
    catalog: &'a SkeletonCatalog,
    converter_path: Option<Utf8PathBuf>,
    assets_root: Option<Utf8PathBuf>,
    textures: TextureResolver,
    metrics: Arc<ImportMetrics>,
}

impl<'a> Importer<'a> {
    pub fn new(catalog: &'a SkeletonCatalog) -> Self {
        Self {
            catalog,
            converter_path: None,
            assets_root: None,
            textures: TextureResolver::new(),
            metrics: Arc::new(ImportMetrics::new()),
        }
    }

    /// Importer configured with the converter and assets root from `preferences`
    pub fn from_preferences(catalog: &'a SkeletonCatalog, preferences: &Preferences) -> Self {
        Self::new(catalog)
            .with_converter(preferences.converter_path())
            .with_assets_root(preferences.assets_root())
    }

    pub fn with_converter(mut self, converter_path: Option<Utf8PathBuf>) -> Self {
        self.converter_path = converter_path;
        self
    }

    pub fn with_assets_root(mut self, assets_root: Option<Utf8PathBuf>) -> Self {
        self.assets_root = assets_root;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<ImportMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &ImportMetrics {
        &self.metrics
    }

    /// The converter, if the configured path points at a file
    fn converter(&self) -> Result<DivineConverter, ImportError> {
        match &self.converter_path {
            Some(path) if path.is_file() => Ok(DivineConverter::new(path.clone())),
            other => Err(ImportError::ConverterNotFound {
                path: other.as_ref().map(ToString::to_string).unwrap_or_default(),
            }),
        }
    }

    /// Pick the skeleton to conform a Granny file to.
    ///
    /// Catalog resolution first; with `Auto` or a key, a miss falls back to the
    /// manual skeleton path if that is a file.
    pub fn resolve_skeleton(&self, options: &ImportOptions, source: &Utf8Path) -> Option<Utf8PathBuf> {
        let filename = source.file_name().unwrap_or(source.as_str());

        if let Some(skeleton) = self.catalog.resolve(&options.conform, filename) {
            return Some(skeleton);
        }

        match (&options.conform, &options.conform_fallback) {
            (ConformMode::Auto | ConformMode::Key(_), Some(fallback)) if fallback.is_file() => {
                tracing::info!("Using conform path '{}'", fallback);
                Some(fallback.clone())
            }
            _ => None,
        }
    }

    /// Run Start and, for Granny files, Convert
    ///
    /// Nothing in the scene is touched.
    pub async fn prepare(
        &self,
        source: &Utf8Path,
        options: &ImportOptions,
    ) -> Result<PreparedImport, ImportError> {
        tracing::info!("Importing file: '{}'", source);

        let format = ImportFormat::from_path(source)
            .ok_or_else(|| ImportError::UnknownExtension(source.to_path_buf()))?;

        match format {
            ImportFormat::Collada => Ok(PreparedImport {
                source: source.to_path_buf(),
                format,
                collada_path: source.to_path_buf(),
                conversion: None,
            }),
            ImportFormat::Granny => {
                let converter = self.converter()?;
                let skeleton = self.resolve_skeleton(options, source);

                tracing::info!("Starting GR2->DAE conversion using {}", converter.exe());
                let output = converter.convert(source, skeleton.as_deref()).await?;
                self.metrics.record_conversion(output.duration);

                Ok(PreparedImport {
                    source: source.to_path_buf(),
                    format,
                    collada_path: output.collada_path.clone(),
                    conversion: Some(output),
                })
            }
        }
    }

    /// Import one file into `scene`
    pub async fn import_file<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        source: &Utf8Path,
        options: &ImportOptions,
    ) -> Result<ImportReport, ImportError> {
        let result = self.run_import(scene, source, options).await;

        match &result {
            Ok(report) => {
                self.metrics.record_file_imported();
                tracing::info!(
                    "Imported '{}': {} new objects, {} failed steps",
                    source,
                    report.new_objects.len(),
                    report.failed_steps().count()
                );
            }
            Err(e) => {
                self.metrics.record_file_failed();
                tracing::error!("Failed to import '{}': {}", source, e);
            }
        }

        result
    }

    async fn run_import<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        source: &Utf8Path,
        options: &ImportOptions,
    ) -> Result<ImportReport, ImportError> {
        let prepared = self.prepare(source, options).await?;

        let before: HashSet<ObjectId> = scene.object_ids().into_iter().collect();
        tracing::info!("Importing collada file: '{}'", prepared.collada_path);
        scene.import_collada(&prepared.collada_path, &options.collada)?;
        let new_objects: Vec<ObjectId> = scene
            .object_ids()
            .into_iter()
            .filter(|id| !before.contains(id))
            .collect();

        tracing::debug!("Scene import created {} objects", new_objects.len());
        self.metrics.record_objects_created(new_objects.len());

        let mut report = ImportReport {
            source: prepared.source,
            format: prepared.format,
            conversion: prepared.conversion,
            new_objects,
            steps: Vec::new(),
            temp_removed: false,
        };

        self.post_process(scene, options, &mut report);

        let temp_collada = report
            .conversion
            .as_ref()
            .map(|conversion| conversion.collada_path.clone())
            .filter(|_| options.delete_temp_collada);
        if let Some(temp_collada) = temp_collada {
            report.temp_removed = remove_temp_collada(&temp_collada, report.has_failures());
        }

        Ok(report)
    }

    fn post_process<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        options: &ImportOptions,
        report: &mut ImportReport,
    ) {
        let new_objects = report.new_objects.clone();
        let mut steps = StepRecorder {
            steps: &mut report.steps,
            metrics: self.metrics.as_ref(),
        };

        if options.actions.any() {
            self.process_actions(scene, &new_objects, options, &report.source, &mut steps);
        }

        if options.apply_transforms {
            self.apply_transforms(scene, &new_objects, &mut steps);
        }

        if options.delete_objects != DeleteFilter::Disabled {
            self.delete_objects(scene, &new_objects, options.delete_objects, &mut steps);
        }

        // Deleting a parent may take children with it
        let remaining: Vec<ObjectId> = new_objects
            .into_iter()
            .filter(|id| scene.object(*id).is_some())
            .collect();

        let file_base = source_base_name(&report.source);

        if options.rename_armatures != RenameMode::Disabled
            || options.rename_meshes != RenameMode::Disabled
        {
            self.rename_objects(scene, &remaining, options, &file_base, &mut steps);
        }

        if options.build_materials {
            match &self.assets_root {
                Some(assets_root) => {
                    self.build_materials(scene, &remaining, &file_base, assets_root, &mut steps)
                }
                None => tracing::info!("No extracted assets directory set, skipping materials"),
            }
        }
    }

    fn process_actions<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        new_objects: &[ObjectId],
        options: &ImportOptions,
        source: &Utf8Path,
        steps: &mut StepRecorder<'_>,
    ) {
        let armatures: Vec<ObjectId> = new_objects
            .iter()
            .copied()
            .filter(|id| {
                scene
                    .object(*id)
                    .is_some_and(|obj| obj.kind == ObjectKind::Armature && obj.has_action)
            })
            .collect();

        if armatures.is_empty() {
            return;
        }
        tracing::info!("New armature objects: ({}). Parsing actions", armatures.len());

        let new_name = action_name(source);
        for id in armatures {
            if options.actions.rename {
                tracing::info!("Renaming action of {} to '{}'", id, new_name);
                steps.record(PostProcessStep::RenameAction, id, scene.rename_action(id, &new_name));
            }
            if options.actions.fake_user {
                steps.record(PostProcessStep::ActionFakeUser, id, scene.set_action_fake_user(id));
            }
            if options.actions.offset_to_frame_one {
                steps.record(
                    PostProcessStep::OffsetAction,
                    id,
                    scene.offset_action_keyframes(id, ACTION_FRAME_OFFSET),
                );
            }
        }
    }

    /// Bake transforms of every new top-level object and its descendants.
    ///
    /// Transform baking works on the active object, so the caller's active
    /// object is held by a guard and restored however this returns.
    fn apply_transforms<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        new_objects: &[ObjectId],
        steps: &mut StepRecorder<'_>,
    ) {
        let new_set: HashSet<ObjectId> = new_objects.iter().copied().collect();
        let roots: Vec<ObjectId> = new_objects
            .iter()
            .copied()
            .filter(|id| {
                scene.object(*id).is_some_and(|obj| match obj.parent {
                    Some(parent) => !new_set.contains(&parent),
                    None => true,
                })
            })
            .collect();

        let mut scene = ActiveObjectGuard::new(scene);
        for root in roots {
            tracing::info!("Applying transformation for object {} and children", root);

            let mut pending = vec![root];
            while let Some(id) = pending.pop() {
                scene.set_active_object(Some(id));
                let result = scene.apply_transforms(id, TransformFlags::ALL);
                steps.record(PostProcessStep::ApplyTransforms, id, result);

                let mut children: Vec<ObjectId> = scene
                    .children(id)
                    .into_iter()
                    .filter(|child| new_set.contains(child))
                    .collect();
                // Depth-first, in child order
                children.reverse();
                pending.extend(children);
            }
        }
    }

    fn delete_objects<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        new_objects: &[ObjectId],
        filter: DeleteFilter,
        steps: &mut StepRecorder<'_>,
    ) {
        let targets: Vec<(ObjectId, String)> = new_objects
            .iter()
            .filter_map(|id| scene.object(*id))
            .filter(|obj| can_delete(obj.kind, filter))
            .map(|obj| (obj.id, obj.name))
            .collect();

        tracing::info!("Deleting {} new objects after import", targets.len());
        for (id, name) in targets {
            // An earlier deletion may already have removed it
            if scene.object(id).is_none() {
                continue;
            }
            tracing::info!("Deleting object '{}'", name);
            if steps.record(PostProcessStep::Delete, id, scene.delete_object(id)) {
                self.metrics.record_object_deleted();
            }
        }
    }

    fn rename_objects<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        objects: &[ObjectId],
        options: &ImportOptions,
        file_base: &str,
        steps: &mut StepRecorder<'_>,
    ) {
        for &id in objects {
            let Some(obj) = scene.object(id) else {
                continue;
            };

            let mode = match obj.kind {
                ObjectKind::Armature => options.rename_armatures,
                ObjectKind::Mesh => options.rename_meshes,
                ObjectKind::Other => continue,
            };

            let Some(candidate) =
                candidate_name(obj.kind, mode, &obj.name, file_base, options.strip_junk)
            else {
                continue;
            };

            // Names of every other data block of this kind, including ones
            // renamed earlier in this pass
            let mut registry = NameRegistry::new(scene.data_names(obj.kind, Some(id)));
            let name = registry.claim(&candidate);

            tracing::info!("Renaming object '{}' => '{}'", obj.name, name);
            if steps.record(PostProcessStep::Rename, id, scene.rename(id, &name)) {
                self.metrics.record_object_renamed();
            }
        }
    }

    fn build_materials<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        objects: &[ObjectId],
        file_base: &str,
        assets_root: &Utf8Path,
        steps: &mut StepRecorder<'_>,
    ) {
        let mut found: Option<TextureSet> = None;

        for &id in objects {
            let Some(mesh) = scene.object(id).filter(|obj| obj.kind == ObjectKind::Mesh) else {
                continue;
            };

            let material_name = format!("{}{}", mesh.name, MATERIAL_SUFFIX);
            let result = match scene.find_material(&material_name) {
                Some(material) => {
                    tracing::info!("Reusing material '{}' for '{}'", material_name, mesh.name);
                    scene.attach_material(id, material)
                }
                None => {
                    let textures = found
                        .get_or_insert_with(|| self.textures.resolve_textures(file_base, assets_root));
                    if !textures.has_pbr() {
                        tracing::info!("No textures found for '{}', no material created", mesh.name);
                        continue;
                    }
                    let created = scene
                        .create_pbr_material(&material_name, textures)
                        .and_then(|material| scene.attach_material(id, material));
                    if created.is_ok() {
                        tracing::info!("Created material for '{}'", mesh.name);
                    }
                    created
                }
            };

            if steps.record(PostProcessStep::Material, id, result) {
                self.metrics.record_material_assigned();
            }
        }
    }

    /// Import `files` one after another
    ///
    /// A failing file never stops the batch. The scene's active object is
    /// restored when the batch ends. Progress and per-file results go to
    /// `state` when one is given.
    pub async fn import_batch<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        files: &[Utf8PathBuf],
        options: &ImportOptions,
        state: Option<&StateManager>,
    ) -> BatchReport {
        let mut scene = ActiveObjectGuard::new(scene);
        let mut batch = BatchReport::default();

        if let Some(state) = state {
            state.start_import(files.to_vec());
            if let Some(directory) = files
                .first()
                .and_then(|file| file.parent())
                .filter(|dir| !dir.as_str().is_empty())
            {
                state.remember_directory(directory);
            }
        }

        for file in files {
            if let Some(state) = state {
                state.update_progress(file.clone(), format!("Importing {}", file));
            }

            let result = self.import_file(&mut *scene, file, options).await;

            if let Some(state) = state {
                let (status, message, new_objects, step_failures) = match &result {
                    Ok(report) => (
                        FileStatus::Imported,
                        format!("{} new objects", report.new_objects.len()),
                        report.new_objects.len(),
                        report.failed_steps().count(),
                    ),
                    Err(e) => (FileStatus::Failed, e.to_string(), 0, 0),
                };
                state.add_file_result(file.clone(), status, message, new_objects, step_failures);
            }

            batch.files.push(FileOutcome {
                source: file.clone(),
                result,
            });
        }

        if let Some(state) = state {
            state.finish_import();
            tracing::info!("{}", state.read(|s| s.summary()));
        }

        batch
    }
}

/// Collects step results, logging failures
struct StepRecorder<'r> {
    steps: &'r mut Vec<StepReport>,
    metrics: &'r ImportMetrics,
}

impl StepRecorder<'_> {
    /// Record a step; returns whether it succeeded
    fn record<T>(&mut self, step: PostProcessStep, target: ObjectId, result: Result<T, SceneError>) -> bool {
        let outcome = match result {
            Ok(_) => StepOutcome::Succeeded,
            Err(e) => {
                tracing::warn!("Failed to {} for object {}: {}", step, target, e);
                self.metrics.record_step_failure();
                StepOutcome::Failed {
                    message: e.to_string(),
                }
            }
        };
        let succeeded = outcome == StepOutcome::Succeeded;
        self.steps.push(StepReport {
            step,
            target,
            outcome,
        });
        succeeded
    }
}

fn can_delete(kind: ObjectKind, filter: DeleteFilter) -> bool {
    match filter {
        DeleteFilter::All => true,
        DeleteFilter::Mesh => kind == ObjectKind::Mesh,
        DeleteFilter::Armature => kind == ObjectKind::Armature,
        DeleteFilter::Disabled => false,
    }
}

/// Remove the temporary Collada file unless post-processing failed.
///
/// # Returns
/// Whether the file was removed
fn remove_temp_collada(path: &Utf8Path, keep: bool) -> bool {
    if keep {
        tracing::info!("Keeping temp file '{}' after post-processing failures", path);
        return false;
    }
    if !path.is_file() {
        return false;
    }

    tracing::info!("Deleting temp file: '{}'", path);
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Failed to delete temp file '{}': {}", path, e);
            false
        }
    }
}
