//! Declared column types of every input table.

use super::ColumnType::{Category, Float, Int};
use super::TableSchema;

pub const REFERENCE_TABLE: TableSchema = TableSchema {
    name: "reference table",
    columns: &[
        ("indicator (as seen in MSD)", Category),
        ("standardizeddisaggregate", Category),
        ("otherdisaggregate", Category),
        ("Fiscal Year (full year)", Int),
        ("Summed vs. Snapshot", Category),
        ("reporting_frequency", Category),
    ],
};

pub const PARTNER_TYPE_TABLE: TableSchema = TableSchema {
    name: "partner type table",
    columns: &[
        ("Mechanism ID", Category),
        ("Partner Type", Category),
        ("G2G", Category),
    ],
};

pub const KNOWN_ISSUES_TABLE: TableSchema = TableSchema {
    name: "known issues table",
    columns: &[
        ("period", Category),
        ("indicator", Category),
        ("operatingunit", Category),
        ("mech_code", Category),
        ("exclude due to known issue", Category),
    ],
};

pub const SITE_EXTRACT: TableSchema = TableSchema {
    name: "site extract",
    columns: &[
        ("operatingunit", Category),
        ("operatingunituid", Category),
        ("countryname", Category),
        ("snu1", Category),
        ("snu1uid", Category),
        ("psnu", Category),
        ("psnuuid", Category),
        ("snuprioritization", Category),
        ("dreams", Category),
        ("primepartner", Category),
        ("fundingagency", Category),
        ("mech_code", Category),
        ("mech_name", Category),
        ("pre_rgnlztn_hq_mech_code", Category),
        ("prime_partner_duns", Category),
        ("award_number", Category),
        ("indicator", Category),
        ("numeratordenom", Category),
        ("indicatortype", Category),
        ("disaggregate", Category),
        ("standardizeddisaggregate", Category),
        ("categoryoptioncomboname", Category),
        ("ageasentered", Category),
        ("trendsfine", Category),
        ("trendssemifine", Category),
        ("trendscoarse", Category),
        ("sex", Category),
        ("statushiv", Category),
        ("statustb", Category),
        ("statuscx", Category),
        ("hiv_treatment_status", Category),
        ("otherdisaggregate", Category),
        ("otherdisaggregate_sub", Category),
        ("modality", Category),
        ("fiscal_year", Int),
        ("targets", Float),
        ("qtr1", Float),
        ("qtr2", Float),
        ("qtr3", Float),
        ("qtr4", Float),
        ("cumulative", Float),
        ("source_name", Category),
    ],
};

pub const NAT_SUBNAT_EXTRACT: TableSchema = TableSchema {
    name: "nat/subnat extract",
    columns: &[
        ("operatingunit", Category),
        ("operatingunituid", Category),
        ("countryname", Category),
        ("snu1", Category),
        ("snu1uid", Category),
        ("psnu", Category),
        ("psnuuid", Category),
        ("snuprioritization", Category),
        ("indicator", Category),
        ("numeratordenom", Category),
        ("indicatortype", Category),
        ("disaggregate", Category),
        ("standardizeddisaggregate", Category),
        ("categoryoptioncomboname", Category),
        ("ageasentered", Category),
        ("trendscoarse", Category),
        ("sex", Category),
        ("statushiv", Category),
        ("otherdisaggregate", Category),
        ("fiscal_year", Int),
        ("targets", Float),
        ("qtr4", Float),
        ("source_name", Category),
    ],
};
