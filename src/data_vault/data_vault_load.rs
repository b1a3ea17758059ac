//! Load orchestration
//!
//! A [`DataVaultLoad`] ties target tables to one extract: it resolves parent
//! tables, hands every table the staging table it loads from, and renders the
//! staging statement followed by the load script in dependency order.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;

use super::constants::{RECORD_SOURCE, RECORD_START_TIMESTAMP};
use super::effectivity_satellite::EffectivitySatellite;
use super::errors::DataVaultError;
use super::field::{DataVaultField, FieldDataType, FieldRole};
use super::hub::Hub;
use super::link::Link;
use super::role_playing_hub::RolePlayingHub;
use super::satellite::Satellite;
use super::table::{DataVaultTable, LoadableEntity, StagingTable};
use crate::sql_generator::{
    is_plain_identifier, quote_literal, render_named_template, SqlPlaceholders, STAGING_TABLE_DDL,
};

/// Rendering of the extract start timestamp in SQL literals.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const SELECT_LIST_SEPARATOR: &str = ",\n      ";
const STAGING_FIELDS_SEPARATOR: &str = ",\n  ";

/// Where a load reads from and how its rows are tagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadParameters {
    pub extract_schema: String,
    pub extract_table: String,
    pub staging_schema: String,
    pub staging_table: String,
    /// Load time written to `r_timestamp` of every staged row
    pub extract_start_timestamp: NaiveDateTime,
    /// Value written to `r_source` of every staged row
    pub record_source: String,
}

/// Any table a load can target.
#[derive(Debug, Clone)]
pub enum TargetTable {
    Hub(Hub),
    RolePlayingHub(RolePlayingHub),
    Link(Link),
    Satellite(Satellite),
    EffectivitySatellite(EffectivitySatellite),
}

impl TargetTable {
    pub fn as_entity(&self) -> &dyn LoadableEntity {
        match self {
            TargetTable::Hub(t) => t,
            TargetTable::RolePlayingHub(t) => t,
            TargetTable::Link(t) => t,
            TargetTable::Satellite(t) => t,
            TargetTable::EffectivitySatellite(t) => t,
        }
    }

    pub fn as_entity_mut(&mut self) -> &mut dyn LoadableEntity {
        match self {
            TargetTable::Hub(t) => t,
            TargetTable::RolePlayingHub(t) => t,
            TargetTable::Link(t) => t,
            TargetTable::Satellite(t) => t,
            TargetTable::EffectivitySatellite(t) => t,
        }
    }

    pub fn name(&self) -> &str {
        self.as_entity().table().name()
    }

    /// Hashkey expression computed in staging, for hubs and links.
    fn staging_hashkey_sql(&self) -> Option<Result<String, DataVaultError>> {
        match self {
            TargetTable::Hub(_) | TargetTable::RolePlayingHub(_) | TargetTable::Link(_) => {
                Some(self.as_entity().table().hashkey_sql())
            }
            _ => None,
        }
    }

    /// Hashdiff expression computed in staging, for satellites.
    fn staging_hashdiff_sql(&self) -> Option<Result<String, DataVaultError>> {
        match self {
            TargetTable::Satellite(t) => Some(t.hashdiff_sql()),
            TargetTable::EffectivitySatellite(t) => Some(t.satellite().hashdiff_sql()),
            _ => None,
        }
    }

    /// Staging column holding the hashkey (hubs, links) or the hashdiff
    /// (satellites) computed for this table.
    fn staging_computed_field(&self) -> Result<&DataVaultField, DataVaultError> {
        match self {
            TargetTable::Satellite(t) => t.hashdiff(),
            TargetTable::EffectivitySatellite(t) => t.satellite().hashdiff(),
            _ => self.as_entity().table().single_field_with_role(FieldRole::Hashkey),
        }
    }
}

impl fmt::Display for TargetTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_entity(), f)
    }
}

impl From<Hub> for TargetTable {
    fn from(table: Hub) -> Self {
        TargetTable::Hub(table)
    }
}

impl From<RolePlayingHub> for TargetTable {
    fn from(table: RolePlayingHub) -> Self {
        TargetTable::RolePlayingHub(table)
    }
}

impl From<Link> for TargetTable {
    fn from(table: Link) -> Self {
        TargetTable::Link(table)
    }
}

impl From<Satellite> for TargetTable {
    fn from(table: Satellite) -> Self {
        TargetTable::Satellite(table)
    }
}

impl From<EffectivitySatellite> for TargetTable {
    fn from(table: EffectivitySatellite) -> Self {
        TargetTable::EffectivitySatellite(table)
    }
}

#[derive(Debug, Clone)]
pub struct DataVaultLoad {
    params: LoadParameters,
    tables: Vec<TargetTable>,
}

impl DataVaultLoad {
    pub fn new(params: LoadParameters, mut tables: Vec<TargetTable>) -> Result<Self, DataVaultError> {
        let load_name = params.staging_table.clone();

        for (what, identifier) in [
            ("extract schema", &params.extract_schema),
            ("extract table", &params.extract_table),
            ("staging schema", &params.staging_schema),
            ("staging table", &params.staging_table),
        ] {
            if !is_plain_identifier(identifier) {
                return Err(DataVaultError::configuration(
                    &load_name,
                    format!("{} '{}' is not a valid SQL identifier", what, identifier),
                ));
            }
        }
        if tables.is_empty() {
            return Err(DataVaultError::configuration(&load_name, "no target tables"));
        }

        let mut seen = HashSet::new();
        for table in &tables {
            if !seen.insert(table.name().to_string()) {
                return Err(DataVaultError::configuration(
                    &load_name,
                    format!("duplicate target table '{}'", table.name()),
                ));
            }
        }

        resolve_parents(&mut tables)?;

        let staging = StagingTable::new(params.staging_schema.clone(), params.staging_table.clone());
        for table in &mut tables {
            table.as_entity_mut().table_mut().set_staging_table(staging.clone());
        }

        let load = Self { params, tables };
        log::info!("{}: instance created with {} tables", load, load.tables.len());
        Ok(load)
    }

    pub fn tables(&self) -> &[TargetTable] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&TargetTable> {
        let name = name.to_lowercase();
        self.tables.iter().find(|table| table.name() == name)
    }

    fn staging_placeholders(&self) -> Result<SqlPlaceholders, DataVaultError> {
        let mut extracted = HashSet::new();
        let mut extract_fields = Vec::new();
        let mut staging_columns = Vec::new();
        for table in &self.tables {
            for field in table.as_entity().table().fields() {
                let extract = matches!(
                    field.role(),
                    FieldRole::BusinessKey | FieldRole::ChildKey | FieldRole::Descriptive
                );
                if extract && extracted.insert(field.name()) {
                    extract_fields.push(format!(
                        "CAST({} AS {}) AS {}",
                        field.name(),
                        field.sql_type(),
                        field.name()
                    ));
                    staging_columns.push(field.ddl_in_staging());
                }
            }
        }
        staging_columns.push(format!(
            "{} {} NOT NULL",
            RECORD_START_TIMESTAMP,
            FieldDataType::Timestamp.as_sql()
        ));
        staging_columns.push(format!("{} {} NOT NULL", RECORD_SOURCE, FieldDataType::Text.as_sql()));

        // Column order follows the SELECT: hashed_data.* (hashkeys last), then hashdiffs.
        let (hashkey_tables, hashdiff_tables): (Vec<&TargetTable>, Vec<&TargetTable>) = self
            .tables
            .iter()
            .partition(|table| {
                matches!(
                    table,
                    TargetTable::Hub(_) | TargetTable::RolePlayingHub(_) | TargetTable::Link(_)
                )
            });
        for table in hashkey_tables.into_iter().chain(hashdiff_tables) {
            staging_columns.push(table.staging_computed_field()?.ddl_in_staging());
        }

        let hashkey_expressions = self
            .tables
            .iter()
            .filter_map(TargetTable::staging_hashkey_sql)
            .collect::<Result<Vec<_>, _>>()?;
        if hashkey_expressions.is_empty() {
            return Err(DataVaultError::configuration(
                &self.params.staging_table,
                "a load needs at least one hub or link",
            ));
        }

        let staging_fields: Vec<String> = std::iter::once(Ok::<_, DataVaultError>("hashed_data.*".to_string()))
            .chain(self.tables.iter().filter_map(TargetTable::staging_hashdiff_sql))
            .collect::<Result<_, _>>()?;

        let extract_start_timestamp = format!(
            "CAST({} AS TIMESTAMP)",
            quote_literal(
                &self
                    .params
                    .extract_start_timestamp
                    .format(TIMESTAMP_FORMAT)
                    .to_string()
            )
        );

        let mut placeholders = SqlPlaceholders::new();
        placeholders.insert("extract_schema".into(), self.params.extract_schema.clone());
        placeholders.insert("extract_table".into(), self.params.extract_table.clone());
        placeholders.insert("staging_schema".into(), self.params.staging_schema.clone());
        placeholders.insert("staging_table".into(), self.params.staging_table.clone());
        placeholders.insert("extract_fields".into(), extract_fields.join(SELECT_LIST_SEPARATOR));
        placeholders.insert("extract_start_timestamp".into(), extract_start_timestamp);
        placeholders.insert(
            "record_source_value".into(),
            quote_literal(&self.params.record_source),
        );
        placeholders.insert("record_start_timestamp".into(), RECORD_START_TIMESTAMP.into());
        placeholders.insert("record_source".into(), RECORD_SOURCE.into());
        placeholders.insert(
            "hashkey_expressions".into(),
            hashkey_expressions.join(SELECT_LIST_SEPARATOR),
        );
        placeholders.insert("staging_fields".into(), staging_fields.join(STAGING_FIELDS_SEPARATOR));
        placeholders.insert("staging_columns".into(), staging_columns.join(STAGING_FIELDS_SEPARATOR));
        Ok(placeholders)
    }

    /// Statement creating the staging table from the extract table.
    ///
    /// Business keys, child keys and descriptive fields of every table are
    /// cast to their declared types once each; hashkeys and hashdiffs are
    /// computed on top of them. The column list declares mandatory fields
    /// `NOT NULL`.
    pub fn staging_create_sql_statement(&self) -> Result<String, DataVaultError> {
        let placeholders = self.staging_placeholders()?;
        let sql = render_named_template(STAGING_TABLE_DDL, &placeholders)
            .map_err(|e| DataVaultError::template(self.to_string(), e))?;

        log::info!("{}: staging SQL generated", self);
        log::debug!("{}:\n({})", self, sql);
        Ok(sql)
    }

    /// One load statement per table: hubs, role-playing hubs, links, then
    /// satellites. Tables of the same kind keep their declaration order.
    pub fn sql_load_script(&self) -> Result<Vec<String>, DataVaultError> {
        let mut entities: Vec<&dyn LoadableEntity> =
            self.tables.iter().map(TargetTable::as_entity).collect();
        entities.sort_by_key(|entity| entity.loading_order());

        entities
            .into_iter()
            .map(|entity| entity.sql_load_statement())
            .collect()
    }
}

/// Attach parents: role-playing hubs by parent hub name, satellites by the
/// hub or link owning their parent hashkey.
fn resolve_parents(tables: &mut [TargetTable]) -> Result<(), DataVaultError> {
    let mut hubs_by_name: HashMap<String, Arc<DataVaultTable>> = HashMap::new();
    let mut tables_by_hashkey: HashMap<String, Arc<DataVaultTable>> = HashMap::new();

    for table in tables.iter() {
        let (entity, is_hub) = match table {
            TargetTable::Hub(hub) => (hub as &dyn LoadableEntity, true),
            TargetTable::Link(link) => (link as &dyn LoadableEntity, false),
            _ => continue,
        };
        let parent = Arc::new(entity.table().clone());
        let hashkey = parent.single_field_with_role(FieldRole::Hashkey)?.name().to_string();
        if is_hub {
            hubs_by_name.insert(parent.name().to_string(), Arc::clone(&parent));
        }
        tables_by_hashkey.insert(hashkey, parent);
    }

    for table in tables.iter_mut() {
        match table {
            TargetTable::RolePlayingHub(hub) => {
                let parent = hubs_by_name.get(hub.parent_hub_name()).ok_or_else(|| {
                    DataVaultError::configuration(
                        hub.table().name(),
                        format!("parent hub '{}' is not part of the load", hub.parent_hub_name()),
                    )
                })?;
                hub.set_parent_table(Arc::clone(parent))?;
            }
            TargetTable::Satellite(satellite) => {
                let parent = find_parent(&tables_by_hashkey, satellite)?;
                satellite.set_parent_table(parent)?;
            }
            TargetTable::EffectivitySatellite(satellite) => {
                let parent = find_parent(&tables_by_hashkey, satellite.satellite())?;
                satellite.set_parent_table(parent)?;
            }
            TargetTable::Hub(_) | TargetTable::Link(_) => {}
        }
    }
    Ok(())
}

fn find_parent(
    tables_by_hashkey: &HashMap<String, Arc<DataVaultTable>>,
    satellite: &Satellite,
) -> Result<Arc<DataVaultTable>, DataVaultError> {
    let hashkey = satellite.parent_hashkey()?.name();
    tables_by_hashkey.get(hashkey).cloned().ok_or_else(|| {
        DataVaultError::configuration(
            satellite.table().name(),
            format!(
                "parent table '{}' is not part of the load",
                satellite.parent_table_name().unwrap_or(hashkey)
            ),
        )
    })
}

impl fmt::Display for DataVaultLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DataVaultLoad: {}.{}",
            self.params.staging_schema, self.params.staging_table
        )
    }
}
