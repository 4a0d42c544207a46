//! Reads managed instances from fetched rows.

use crate::mapping::ClassMapping;

use stratum_core::{
    driver::{EagerMode, ResultRow, Select},
    Result, StateManager, Store,
};

/// Adds everything needed to load an instance of `cls` to `select`: the
/// joins to superclass tables, the version, the discriminator and the
/// columns of every field. Relations are selected lazily when the class
/// does not support `eager`. Returns `true` if anything was selected.
pub fn select(cls: &ClassMapping, select: &mut Select, eager: EagerMode) -> Result<bool> {
    let eager = if cls.strategy().supports_eager_select(cls, select, eager) {
        eager
    } else {
        EagerMode::None
    };

    let joins = std::mem::take(select.joins_mut());
    *select.joins_mut() = cls.strategy().join_superclass(cls, joins, false)?;

    let mut selected = cls.version().strategy().select(cls, select)?;
    selected |= cls.discriminator().strategy().select(cls, select)?;

    for declaring in cls.hierarchy() {
        for field in declaring.fields() {
            selected |= field.strategy().select(declaring, field, select, eager)?;
        }
    }

    Ok(selected)
}

/// Loads an instance of `cls` from `result`. A class strategy loading
/// instances itself takes precedence.
pub async fn load(
    cls: &ClassMapping,
    sm: &mut dyn StateManager,
    store: &dyn Store,
    result: &ResultRow,
) -> Result<()> {
    if cls
        .strategy()
        .custom_load_result(cls, sm, store, result)
        .await?
    {
        return Ok(());
    }

    let version = cls.version().strategy();
    version.load(cls, sm, result)?;

    for declaring in cls.hierarchy() {
        for field in declaring.fields() {
            field
                .strategy()
                .load(declaring, field, sm, store, result)
                .await?;
        }
    }

    version.after_load(cls, sm)
}
