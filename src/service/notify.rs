use crate::{
    compile::Change,
    config::{BundleKind, Config},
    ext::PathExt,
    internal_prelude::*,
    logger::GRAY,
    signal::Interrupt,
};
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use notify_debouncer_full::{
    new_debouncer,
    notify::{
        event::{CreateKind, ModifyKind, RemoveKind, RenameMode},
        EventKind, RecursiveMode,
    },
    DebounceEventResult, DebouncedEvent,
};
use std::{fmt::Display, path::Path, sync::Arc};
use tokio::task::JoinHandle;

const DEBOUNCE: Duration = Duration::from_millis(200);

/// Watches the work path and records the pipeline steps its changes affect.
pub fn spawn(conf: &Arc<Config>) -> Result<JoinHandle<()>> {
    let root = conf.work_dir.clone();
    ensure!(root.exists(), "Notify work path {root} does not exist");
    info!("Notify watching {}", GRAY.paint(root.as_str()));

    let conf = conf.clone();
    Ok(tokio::spawn(async move { run(root, conf).await }))
}

async fn run(root: Utf8PathBuf, conf: Arc<Config>) {
    let (sync_tx, sync_rx) = std::sync::mpsc::channel::<DebouncedEvent>();

    std::thread::spawn(move || {
        while let Ok(event) = sync_rx.recv() {
            match Watched::try_new(&event) {
                Ok(Some(watched)) => handle(watched, &conf),
                Err(e) => error!("Notify error {e}"),
                _ => trace!("Notify not handled {}", GRAY.paint(format!("{event:?}"))),
            }
        }
        debug!("Notify stopped");
    });

    let debouncer = new_debouncer(DEBOUNCE, None, move |res: DebounceEventResult| match res {
        Ok(events) => {
            for event in events {
                if sync_tx.send(event).is_err() {
                    return;
                }
            }
        }
        Err(errors) => {
            for e in errors {
                error!("Notify watch error {e}");
            }
        }
    });
    let mut debouncer = match debouncer {
        Ok(debouncer) => debouncer,
        Err(e) => {
            error!("Notify could not start the file watcher: {e}");
            return;
        }
    };

    if let Err(e) = debouncer.watch(root.as_std_path(), RecursiveMode::Recursive) {
        error!("Notify could not watch {root} due to {e}");
        return;
    }

    if let Err(e) = Interrupt::subscribe_shutdown().recv().await {
        trace!("Notify stopped due to: {e:?}");
    }
}

fn handle(watched: Watched, conf: &Config) {
    trace!("Notify handle {}", GRAY.paint(watched.to_string()));

    let paths = watched.paths();
    if paths.is_empty() {
        Interrupt::send_all_changed();
        return;
    }

    let mut changes = Vec::new();
    for path in paths {
        for change in changes_for(conf, path) {
            if !changes.contains(&change) {
                changes.push(change);
            }
        }
    }

    if changes.is_empty() {
        trace!(
            "Notify changed but not watched: {}",
            GRAY.paint(watched.to_string())
        );
    } else {
        debug!("Notify {} changes {changes:?}", GRAY.paint(watched.to_string()));
        Interrupt::send(&changes);
    }
}

/// The bundles and copy sets that have to run again after `path` changed.
pub fn changes_for(conf: &Config, path: &Utf8Path) -> Vec<Change> {
    if path.starts_with(&conf.build_dir) || path.starts_with(&conf.production_dir) {
        return Vec::new();
    }

    let mut changes = Vec::new();
    for bundle in &conf.bundles {
        let listed = bundle.files.iter().any(|f| f == path);
        // less and css sources may import their neighbours
        let imported = bundle.kind == BundleKind::Style
            && path.is_ext_any(&["less", "css"])
            && path.starts_with_any(&bundle.source_dirs());
        if listed || imported {
            changes.push(Change::Step(bundle.name.clone()));
        }
    }
    for set in &conf.copies {
        if set.covers(path) {
            changes.push(Change::Step(set.name.clone()));
        }
    }
    changes
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Watched {
    Remove(Utf8PathBuf),
    Rename(Utf8PathBuf, Utf8PathBuf),
    Write(Utf8PathBuf),
    Create(Utf8PathBuf),
    Rescan,
}

fn convert(p: &Path) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(p.to_path_buf())
        .map_err(|e| eyre!("Could not convert to a Utf8PathBuf: {e:?}"))
}

fn first(event: &DebouncedEvent) -> Result<Utf8PathBuf> {
    let path = event
        .paths
        .first()
        .ok_or_else(|| eyre!("Notify event {:?} without a path", event.kind))?;
    convert(path)
}

impl Watched {
    pub(crate) fn try_new(event: &DebouncedEvent) -> Result<Option<Self>> {
        if event.need_rescan() {
            return Ok(Some(Self::Rescan));
        }
        Ok(match event.kind {
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() == 2 => {
                Some(Self::Rename(
                    convert(&event.paths[0])?,
                    convert(&event.paths[1])?,
                ))
            }
            // an unmatched rename leaves a file created or removed at that path
            EventKind::Modify(ModifyKind::Name(_)) => Some(Self::Write(first(event)?)),
            EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Other | ModifyKind::Any) => {
                Some(Self::Write(first(event)?))
            }
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Create(CreateKind::File) => Some(Self::Create(first(event)?)),
            EventKind::Remove(RemoveKind::File) => Some(Self::Remove(first(event)?)),
            EventKind::Create(_) | EventKind::Remove(_) => None,
            EventKind::Other | EventKind::Any | EventKind::Access(_) => None,
        })
    }

    /// the paths touched, empty for a rescan
    pub fn paths(&self) -> Vec<&Utf8PathBuf> {
        match self {
            Self::Remove(p) | Self::Write(p) | Self::Create(p) => vec![p],
            Self::Rename(from, to) => vec![from, to],
            Self::Rescan => Vec::new(),
        }
    }
}

impl Display for Watched {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create(p) => write!(f, "create {p:?}"),
            Self::Remove(p) => write!(f, "remove {p:?}"),
            Self::Write(p) => write!(f, "write {p:?}"),
            Self::Rename(fr, to) => write!(f, "rename {fr:?} -> {to:?}"),
            Self::Rescan => write!(f, "rescan"),
        }
    }
}
