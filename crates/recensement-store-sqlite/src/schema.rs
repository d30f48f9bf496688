//! SQL schema for the census SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema version; there are no migrations yet.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- AUTOINCREMENT keeps surrogate ids stable: a deleted id is never reused.
CREATE TABLE IF NOT EXISTS regions (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    code  TEXT NOT NULL UNIQUE,
    nom   TEXT NOT NULL
);

-- The department name is not stored; it comes from the geography API.
CREATE TABLE IF NOT EXISTS departments (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    code       TEXT NOT NULL UNIQUE,
    region_id  INTEGER REFERENCES regions(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS cities (
    id                         INTEGER PRIMARY KEY AUTOINCREMENT,
    nom                        TEXT    NOT NULL,
    nb_habitants               INTEGER NOT NULL CHECK (nb_habitants >= 0),
    code_arrondissement        TEXT    NOT NULL DEFAULT '',
    code_canton                TEXT    NOT NULL DEFAULT '',
    code_commune               TEXT    NOT NULL DEFAULT '',
    population_municipale      INTEGER NOT NULL DEFAULT 0,
    population_comptee_a_part  INTEGER NOT NULL DEFAULT 0,
    population_totale          INTEGER NOT NULL DEFAULT 0,
    department_id              INTEGER NOT NULL REFERENCES departments(id) ON DELETE CASCADE,
    UNIQUE (nom, department_id)
);

CREATE INDEX IF NOT EXISTS regions_nom_idx          ON regions(nom);
CREATE INDEX IF NOT EXISTS departments_region_idx   ON departments(region_id);
CREATE INDEX IF NOT EXISTS cities_population_idx    ON cities(nb_habitants);
CREATE INDEX IF NOT EXISTS cities_department_idx    ON cities(department_id, nb_habitants);

PRAGMA user_version = 1;
";
