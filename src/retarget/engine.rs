//! The retargeting orchestrator.
//!
//! [`Retargeter`] applies the rewrite passes to one module in a fixed order:
//!
//! 1. skip modules that do not reference the source library
//! 2. remap type references and security attribute types, then register new target libraries
//! 3. remove the target-framework attribute (if enabled)
//! 4. synthesize accessor pairs, then dummy bodies for the remaining stubs, type by type with
//!    nested types after their declaring type (if enabled)
//!
//! [`Retargeter::process_file`] wraps this with loading and saving through a
//! [`ModuleStore`], and [`Retargeter::run`] processes many files in parallel.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::{error, info};
use rayon::prelude::*;

use crate::{
    metadata::{
        module::{Module, TokenAllocator},
        typesystem::TypeDef,
    },
    retarget::{
        AccessorSynthesizer, FileJob, FileOutcome, MappingTable, ModuleReport, RetargetConfig,
        RunSummary, StubSynthesizer, TypeRefRemapper,
    },
    store::{ModuleStore, WriteOptions},
    Error, Result,
};

/// Full constructor name of the attribute recording the framework a module was built against.
pub const TARGET_FRAMEWORK_CTOR: &str =
    "System.Void System.Runtime.Versioning.TargetFrameworkAttribute::.ctor(System.String)";

/// Applies the configured rewrites to modules and files.
pub struct Retargeter {
    config: RetargetConfig,
    mapping: MappingTable,
    store: Box<dyn ModuleStore>,
    accessors: AccessorSynthesizer,
    stubs: StubSynthesizer,
}

impl Retargeter {
    /// Create a retargeter reading and writing through `store`
    #[must_use]
    pub fn new(config: RetargetConfig, mapping: MappingTable, store: Box<dyn ModuleStore>) -> Self {
        Self {
            config,
            mapping,
            store,
            accessors: AccessorSynthesizer::new(),
            stubs: StubSynthesizer::new(),
        }
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &RetargetConfig {
        &self.config
    }

    /// The mapping table in use
    #[must_use]
    pub fn mapping(&self) -> &MappingTable {
        &self.mapping
    }

    /// Rewrite `module` in place.
    ///
    /// Returns `None`, leaving the module untouched, if it does not reference the source
    /// library.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBody`] if a synthesized body fails validation.
    pub fn process_module(&self, module: &mut Module) -> Result<Option<ModuleReport>> {
        module.reindex();

        let source = self.mapping.source();
        if !module.references_assembly(source) {
            info!("{} does not reference {source}, skipping", module.name);
            return Ok(None);
        }

        let mut report = ModuleReport {
            module: module.name.clone(),
            ..ModuleReport::default()
        };

        let remapper = TypeRefRemapper::new(&self.mapping);
        let (patched, mut unmapped) = remapper.remap_all(module.type_refs.iter_mut());
        report.remapped_type_refs = patched;

        module.for_each_security_declaration_mut(|declaration| {
            let (patched, missing) = remapper.remap_all(
                declaration
                    .attributes
                    .iter_mut()
                    .map(|attribute| &mut attribute.attribute_type),
            );
            report.remapped_security_refs += patched;
            unmapped.extend(missing);
        });
        unmapped.sort();
        unmapped.dedup();
        report.unmapped = unmapped;
        report.added_assembly_refs = module.register_scope_assemblies();

        if self.config.strip_target {
            report.stripped_target_framework = strip_target_framework(module);
        }

        if self.config.strip_internal {
            let (types, allocator) = module.types_mut();
            for ty in types {
                self.rewrite_type(ty, allocator, &mut report)?;
            }
        }

        info!(
            "{}: {} type references retargeted, {} accessor pairs, {} stubs",
            report.module,
            report.total_remapped(),
            report.accessors.len(),
            report.stubs.len()
        );
        Ok(Some(report))
    }

    fn rewrite_type(
        &self,
        ty: &mut TypeDef,
        allocator: &mut TokenAllocator,
        report: &mut ModuleReport,
    ) -> Result<()> {
        report
            .accessors
            .extend(self.accessors.synthesize(ty, allocator)?);
        report.stubs.extend(self.stubs.synthesize(ty)?);
        for nested in &mut ty.nested_types {
            self.rewrite_type(nested, allocator, report)?;
        }
        Ok(())
    }

    /// Load, rewrite and save one file.
    ///
    /// Files that are not modules, and modules without a source reference, are skipped
    /// without error and nothing is written for them.
    ///
    /// # Errors
    /// Returns [`Error::DestinationExists`] if the output exists and overwriting is off, and
    /// any error from loading, rewriting or saving.
    pub fn process_file(&self, job: &FileJob) -> Result<FileOutcome> {
        if !self.config.dry_run && !self.config.overwrite && job.output.exists() {
            return Err(Error::DestinationExists(job.output.clone()));
        }

        let mut module = match self.store.load(&job.input) {
            Ok(module) => module,
            Err(Error::NotAModule(reason)) => {
                info!("Skipping {reason}");
                return Ok(FileOutcome::NotAModule);
            }
            Err(e) => return Err(e),
        };

        let Some(report) = self.process_module(&mut module)? else {
            return Ok(FileOutcome::NoSourceReference);
        };

        if self.config.dry_run {
            info!("Dry run, not writing {}", job.output.display());
            return Ok(FileOutcome::Processed {
                report,
                written: false,
            });
        }

        let options = WriteOptions::preserving().with_overwrite(self.config.overwrite);
        self.store.save(&module, &job.output, &options)?;
        info!("Wrote {}", job.output.display());
        Ok(FileOutcome::Processed {
            report,
            written: true,
        })
    }

    /// Process `jobs` in parallel, one worker per file.
    ///
    /// Failures are logged and counted; they never stop the other files.
    pub fn run(&self, jobs: &[FileJob]) -> RunSummary {
        let processed = AtomicUsize::new(0);
        let errors = AtomicUsize::new(0);
        let skipped = AtomicUsize::new(0);

        let mut modules: Vec<ModuleReport> = jobs
            .par_iter()
            .filter_map(|job| match self.process_file(job) {
                Ok(FileOutcome::Processed { report, .. }) => {
                    processed.fetch_add(1, Ordering::Relaxed);
                    Some(report)
                }
                Ok(FileOutcome::NotAModule | FileOutcome::NoSourceReference) => {
                    skipped.fetch_add(1, Ordering::Relaxed);
                    None
                }
                Err(e) => {
                    error!("{}: {e}", job.input.display());
                    errors.fetch_add(1, Ordering::Relaxed);
                    None
                }
            })
            .collect();
        modules.sort_by(|a, b| a.module.cmp(&b.module));

        RunSummary {
            processed: processed.into_inner(),
            errors: errors.into_inner(),
            skipped: skipped.into_inner(),
            modules,
        }
    }
}

/// Remove the target-framework attribute, returning true if one was present.
fn strip_target_framework(module: &mut Module) -> bool {
    let before = module.custom_attributes.len();
    module
        .custom_attributes
        .retain(|attribute| attribute.constructor.full_name() != TARGET_FRAMEWORK_CTOR);
    module.custom_attributes.len() != before
}
