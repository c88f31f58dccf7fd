use crate::config::{ConfigError, ConfigStore};
use crate::models::{DeviceId, Game};
use crate::ui::Prompter;
use indexmap::{IndexMap, IndexSet};

/// Result of [`check_current_device_save_paths`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The game has no save units, or the current device already has a path
    NotNeeded,
    /// No other device has a path to copy
    NoSource,
    /// The user dismissed the device picker
    Cancelled,
    /// Paths were copied from `from`; `changed` is false when every gap was
    /// already filled
    Copied { from: DeviceId, changed: bool },
}

/// Whether `current` is missing from every save unit of `game`.
///
/// A game without save units never needs reconciliation.
pub fn needs_reconciliation(game: &Game, current: &str) -> bool {
    !game.save_paths.is_empty()
        && game
            .save_paths
            .iter()
            .all(|unit| unit.path_for_device(current).is_none())
}

/// Other devices that have at least one non-blank save or launch path,
/// ordered by first appearance
pub fn source_candidates(game: &Game, current: &str) -> Vec<DeviceId> {
    let save_paths = game.save_paths.iter().flat_map(|unit| unit.paths.iter());

    save_paths
        .chain(game.game_paths.iter())
        .filter(|(device, path)| device.as_str() != current && !path.trim().is_empty())
        .map(|(device, _)| device.clone())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Fill the gaps of `to` with the paths recorded for `from`.
///
/// Only empty or absent destination entries are written; a non-blank path
/// already recorded for `to` is kept even when it differs. Returns whether
/// anything changed.
pub fn copy_missing_paths(game: &mut Game, from: &str, to: &str) -> bool {
    let mut changed = false;

    for unit in &mut game.save_paths {
        if let Some(source) = unit.path_for_device(from).map(str::to_string) {
            changed |= fill(&mut unit.paths, to, source);
        }
    }

    if let Some(source) = game.game_path_for_device(from).map(str::to_string) {
        changed |= fill(&mut game.game_paths, to, source);
    }

    changed
}

fn fill(paths: &mut IndexMap<DeviceId, String>, device: &str, source: String) -> bool {
    match paths.get_mut(device) {
        Some(existing) if !existing.trim().is_empty() => false,
        Some(existing) => {
            *existing = source;
            true
        }
        None => {
            paths.insert(device.to_string(), source);
            true
        }
    }
}

/// Offer to copy another device's paths to the device we run on.
///
/// With a single candidate the copy happens without asking. With several the
/// user picks one through `prompter`; a dismissed or out-of-range answer
/// cancels without touching the document. The document is saved only when
/// something was copied.
pub async fn check_current_device_save_paths(
    store: &ConfigStore,
    prompter: &dyn Prompter,
    game_name: &str,
    current_device_id: &str,
) -> Result<Reconciliation, ConfigError> {
    let ctx = store.context();

    let snapshot = store
        .read(|config| {
            config
                .find_game(game_name)
                .cloned()
                .map(|game| (game, config.clone()))
        })
        .ok_or(ConfigError::NotLoaded)?;
    let Some((game, config)) = snapshot else {
        return Err(ConfigError::GameNotFound(game_name.to_string()));
    };

    if !needs_reconciliation(&game, current_device_id) {
        return Ok(Reconciliation::NotNeeded);
    }

    let candidates = source_candidates(&game, current_device_id);
    let source = match candidates.as_slice() {
        [] => {
            tracing::debug!("No device has paths recorded for {}", game.name);
            return Ok(Reconciliation::NoSource);
        }
        [only] => only.clone(),
        _ => {
            let labels: Vec<String> = candidates.iter().map(|id| config.device_label(id)).collect();
            let title = ctx.t_with("device.choose_source_title", &[("game", &game.name)]);

            match prompter.choose(&title, &labels).await {
                Some(index) if index < candidates.len() => candidates[index].clone(),
                choice => {
                    tracing::info!("Path copy for {} canceled (choice {:?})", game.name, choice);
                    ctx.notifications.info(ctx.t("common.operation_canceled"));
                    return Ok(Reconciliation::Cancelled);
                }
            }
        }
    };

    let mut preview = game.clone();
    if !copy_missing_paths(&mut preview, &source, current_device_id) {
        return Ok(Reconciliation::Copied {
            from: source,
            changed: false,
        });
    }

    let changed = store.update(|config| {
        config
            .find_game_mut(game_name)
            .map(|game| copy_missing_paths(game, &source, current_device_id))
    })?;
    let Some(changed) = changed else {
        return Err(ConfigError::GameNotFound(game_name.to_string()));
    };

    if changed {
        store.save_config().await?;

        let label = config.device_label(&source);
        tracing::info!("Copied paths for {} from {}", game.name, label);
        ctx.metrics.record_paths_reconciled();
        ctx.notifications.success(
            ctx.t_with("device.paths_copied", &[("game", &game.name), ("device", &label)]),
        );
    }

    Ok(Reconciliation::Copied {
        from: source,
        changed,
    })
}
