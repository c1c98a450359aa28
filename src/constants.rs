//! Column, indicator and schema constants shared across the pipeline stages.
//!
//! Raw extract columns keep their lower-case run-together spelling
//! (`operatingunit`); the reporting convention introduced by the naming stage
//! uses the spellings in the second half of [`columns`].

pub mod columns {
    // Raw extract dimensions
    pub const OPERATINGUNIT: &str = "operatingunit";
    pub const COUNTRYNAME: &str = "countryname";
    pub const FUNDINGAGENCY: &str = "fundingagency";
    pub const MECH_CODE: &str = "mech_code";
    pub const INDICATOR: &str = "indicator";
    pub const NUMERATORDENOM: &str = "numeratordenom";
    pub const DISAGGREGATE: &str = "disaggregate";
    pub const STANDARDIZEDDISAGGREGATE: &str = "standardizeddisaggregate";
    pub const OTHERDISAGGREGATE: &str = "otherdisaggregate";
    pub const STATUSHIV: &str = "statushiv";
    pub const MODALITY: &str = "modality";
    pub const PSNU: &str = "psnu";
    pub const SOURCE_NAME: &str = "source_name";

    // Raw extract measures
    pub const FISCAL_YEAR: &str = "fiscal_year";
    pub const TARGETS: &str = "targets";
    pub const QTR1: &str = "qtr1";
    pub const QTR2: &str = "qtr2";
    pub const QTR3: &str = "qtr3";
    pub const QTR4: &str = "qtr4";
    pub const QUARTERS: [&str; 4] = [QTR1, QTR2, QTR3, QTR4];
    pub const CUMULATIVE: &str = "cumulative";

    // Reference table
    pub const REF_INDICATOR: &str = "indicator (as seen in MSD)";
    pub const REF_FISCAL_YEAR: &str = "Fiscal Year (full year)";
    pub const SUMMED_VS_SNAPSHOT: &str = "Summed vs. Snapshot";
    pub const REPORTING_FREQUENCY: &str = "reporting_frequency";

    // Partner type and known issue tables
    pub const MECHANISM_ID: &str = "Mechanism ID";
    pub const PARTNER_TYPE: &str = "Partner Type";
    pub const G2G: &str = "G2G";
    pub const PERIOD: &str = "period";
    pub const EXCLUDE_DUE_TO_KNOWN_ISSUE: &str = "exclude due to known issue";

    // Derived quarterly measures
    pub const QTR_TARGETS: [&str; 4] = [
        "qtr1|Targets (for Q. Ach)",
        "qtr2|Targets (for Q. Ach)",
        "qtr3|Targets (for Q. Ach)",
        "qtr4|Targets (for Q. Ach)",
    ];
    pub const QTR_RUNNING_CUMULATIVE: [&str; 4] = [
        "qtr1|Running Cumulative",
        "qtr2|Running Cumulative",
        "qtr3|Running Cumulative",
        "qtr4|Running Cumulative",
    ];

    // Long format
    pub const QUARTER: &str = "quarter";
    pub const VALUES: &str = "values";
    pub const RESULTS_OR_TARGETS: &str = "Results or Targets";
    pub const FY: &str = "FY";
    pub const RESULTS: &str = "results";
    pub const RUNNING_CUMULATIVE: &str = "Running Cumulative";
    pub const TARGETS_FOR_Q_ACH: &str = "Targets (for Q. Ach)";
    pub const INDEX: &str = "index";
    pub const COMMUNITY_FACILITY: &str = "community_facility";
    pub const KEY_POPS: &str = "key_pops";
    pub const CURRENT_QUARTER: &str = "Current Quarter";
    pub const QUARTER_CALENDAR_DATE: &str = "quarter calendar date";

    // Reporting convention
    pub const OPERATING_UNIT: &str = "operating_unit";
    pub const NUMERATOR_DENOM: &str = "numerator_denom";
    pub const STANDARDIZED_DISAGGREGATE: &str = "standardized_disaggregate";
    pub const OTHER_DISAGGREGATE: &str = "other_disaggregate";
}

pub mod indicators {
    pub const TX_CURR: &str = "TX_CURR";
    pub const TX_NET_NEW: &str = "TX_NET_NEW";
    pub const TX_MMD: &str = "TX_MMD";
    pub const TX_PVLS: &str = "TX_PVLS";
    pub const TX_VL_COVERAGE: &str = "TX_VL_COVERAGE";
    pub const PMTCT_ART: &str = "PMTCT_ART";
    pub const PMTCT_HEI_POS: &str = "PMTCT_HEI_POS";
    pub const PMTCT_HEI_POS_ART: &str = "PMTCT_HEI_POS_ART";
}

/// Disaggregate holding multi-month dispensing counts of TX_CURR.
pub const ARV_DISPENSE_DISAGGREGATE: &str = "Age/Sex/ARVDispense/HIVStatus";
pub const HEI_ART_STATUS_DISAGGREGATE: &str = "Age/HIVStatus/ARTStatus";
pub const TOTAL_NUMERATOR: &str = "Total Numerator";
pub const TOTAL_DENOMINATOR: &str = "Total Denominator";
pub const DERIVED_SOURCE: &str = "Derived";

/// Sentinel for period labels that could not be rebuilt.
pub const ERROR_SENTINEL: &str = "ERROR";

/// Column order after the reference join.
pub const REFERENCE_JOIN_ORDER: &[&str] = &[
    "operatingunit",
    "operatingunituid",
    "countryname",
    "snu1",
    "snu1uid",
    "snuprioritization",
    "dreams",
    "psnu",
    "psnuuid",
    "fundingagency",
    "mech_name",
    "mech_code",
    "pre_rgnlztn_hq_mech_code",
    "award_number",
    "primepartner",
    "prime_partner_duns",
    "indicatortype",
    "indicator",
    "numeratordenom",
    "standardizeddisaggregate",
    "disaggregate",
    "otherdisaggregate",
    "otherdisaggregate_sub",
    "sex",
    "modality",
    "ageasentered",
    "trendsfine",
    "trendssemifine",
    "trendscoarse",
    "hiv_treatment_status",
    "statushiv",
    "statustb",
    "statuscx",
    "categoryoptioncomboname",
    "fiscal_year",
    "targets",
    "qtr1",
    "qtr2",
    "qtr3",
    "qtr4",
    "cumulative",
    "source_name",
    "Summed vs. Snapshot",
    "reporting_frequency",
];

/// Column order of the reunited wide table. The order of its float columns
/// drives the row order of the long pivot.
pub const REUNITE_ORDER: &[&str] = &[
    "qtr1|Targets (for Q. Ach)",
    "qtr2|Targets (for Q. Ach)",
    "qtr3|Targets (for Q. Ach)",
    "qtr4|Targets (for Q. Ach)",
    "qtr4|Running Cumulative",
    "qtr3|Running Cumulative",
    "qtr2|Running Cumulative",
    "qtr1|Running Cumulative",
    "fiscal_year",
    "targets",
    "qtr1",
    "qtr2",
    "qtr3",
    "cumulative",
    "operatingunit",
    "operatingunituid",
    "countryname",
    "snu1",
    "snu1uid",
    "snuprioritization",
    "dreams",
    "psnu",
    "psnuuid",
    "fundingagency",
    "mech_name",
    "mech_code",
    "pre_rgnlztn_hq_mech_code",
    "award_number",
    "primepartner",
    "prime_partner_duns",
    "indicatortype",
    "indicator",
    "numeratordenom",
    "standardizeddisaggregate",
    "disaggregate",
    "otherdisaggregate",
    "otherdisaggregate_sub",
    "sex",
    "modality",
    "ageasentered",
    "trendsfine",
    "trendssemifine",
    "trendscoarse",
    "hiv_treatment_status",
    "statushiv",
    "statustb",
    "statuscx",
    "categoryoptioncomboname",
    "source_name",
    "Summed vs. Snapshot",
    "reporting_frequency",
    "qtr4",
];

pub const GEOGRAPHY_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Democratic Republic of the Congo", "DRC"),
    ("Papua New Guinea", "PNG"),
];

pub const MODALITY_LABELS: &[(&str, &str)] = &[
    ("Inpat", "Inpatient"),
    ("HomeMod", "Community Home-Based"),
    ("Index", "Index (Facility)"),
    ("IndexMod", "Index (Community)"),
    ("MobileMod", "Community Mobile"),
    ("TBClinic", "TB Clinic"),
    ("OtherPITC", "Other PITC"),
    ("VCTMod", "Community VCT"),
    ("OtherMod", "Other Community"),
    ("Emergency Ward", "Emergency"),
];

/// Raw extract names -> reporting convention names.
pub const NAMING_CONVENTION: &[(&str, &str)] = &[
    ("statushiv", "Status HIV"),
    ("statustb", "Status TB"),
    ("statuscx", "Status CX"),
    ("categoryoptioncomboname", "category_option_combo_name"),
    ("hiv_treatment_status", "HIV_treatment_status"),
    ("ageasentered", "age_as_entered"),
    ("trendscoarse", "age_coarse"),
    ("trendssemifine", "age_semifine"),
    ("trendsfine", "age_fine"),
    ("otherdisaggregate", "other_disaggregate"),
    ("numeratordenom", "numerator_denom"),
    ("indicatortype", "indicator_type"),
    ("primepartner", "prime_partner"),
    ("fundingagency", "funding_agency"),
    ("countryname", "country_name"),
    ("snuprioritization", "SNU_prioritization"),
    ("snu1uid", "SNU UID"),
    ("snu1", "SNU"),
    ("psnu", "PSNU"),
    ("psnuuid", "PSNU UID"),
    ("operatingunituid", "operating_unit_uid"),
    ("operatingunit", "operating_unit"),
    ("dreams", "DREAMS"),
    ("standardizeddisaggregate", "standardized_disaggregate"),
];

/// Other-disaggregate values that never contribute to viral load coverage.
pub const VLC_EXCLUDED_OTHER_DISAGGREGATES: &[&str] = &[
    "AZT",
    "Breastfeeding, Routine",
    "Breastfeeding, Targeted",
    "Breastfeeding, Undocumented Test Indication",
    "Life-long ART, New",
    "Single-dose NVP",
    "Triple-drug ARV",
];

/// The 51 columns of the fact table, in output order.
pub const FINAL_COLUMN_ORDER: &[&str] = &[
    "FY",
    "quarter",
    "exclude due to known issue",
    "Partner Type",
    "G2G",
    "indicator",
    "community_facility",
    "modality",
    "otherdisaggregate_sub",
    "mech_code",
    "pre_rgnlztn_hq_mech_code",
    "SNU UID",
    "standardized_disaggregate",
    "prime_partner_duns",
    "results",
    "SNU_prioritization",
    "Running Cumulative",
    "index",
    "PSNU",
    "Status TB",
    "operating_unit_uid",
    "age_coarse",
    "HIV_treatment_status",
    "Targets (for Q. Ach)",
    "PSNU UID",
    "award_number",
    "prime_partner",
    "values",
    "indicator_type",
    "targets",
    "age_fine",
    "age_semifine",
    "Results or Targets",
    "Status CX",
    "other_disaggregate",
    "disaggregate",
    "country_name",
    "age_as_entered",
    "funding_agency",
    "SNU",
    "numerator_denom",
    "source_name",
    "mech_name",
    "Status HIV",
    "sex",
    "cumulative",
    "category_option_combo_name",
    "operating_unit",
    "DREAMS",
    "key_pops",
    "Current Quarter",
];

/// Fact table names -> downstream store names, in the store's column order.
pub const OUTPUT_SCHEMA: &[(&str, &str)] = &[
    ("FY", "fy"),
    ("quarter", "quarter"),
    ("values", "values"),
    ("Targets (for Q. Ach)", "targets_for_q_ach"),
    ("Running Cumulative", "running_cumulative"),
    ("targets", "targets"),
    ("operating_unit", "operating_unit"),
    ("country_name", "country_name"),
    ("modality", "modality"),
    ("index", "index"),
    ("community_facility", "community_facility"),
    ("key_pops", "key_pops"),
    ("funding_agency", "funding_agency"),
    ("Current Quarter", "current_quarter"),
    ("cumulative", "cumulative"),
    ("results", "results"),
    ("Results or Targets", "results_or_targets"),
    ("operating_unit_uid", "operating_unit_uid"),
    ("SNU", "snu"),
    ("SNU UID", "snu_uid"),
    ("SNU_prioritization", "snu_prioritization"),
    ("DREAMS", "dreams"),
    ("PSNU", "psnu"),
    ("PSNU UID", "psnu_uid"),
    ("mech_name", "mech_name"),
    ("mech_code", "mech_code"),
    ("pre_rgnlztn_hq_mech_code", "pre_rgnlztn_hq_mech_code"),
    ("award_number", "award_number"),
    ("prime_partner", "prime_partner"),
    ("prime_partner_duns", "prime_partner_duns"),
    ("indicator_type", "indicator_type"),
    ("indicator", "indicator"),
    ("numerator_denom", "numerator_denom"),
    ("standardized_disaggregate", "standardized_disaggregate"),
    ("disaggregate", "disaggregate"),
    ("other_disaggregate", "other_disaggregate"),
    ("otherdisaggregate_sub", "otherdisaggregate_sub"),
    ("sex", "sex"),
    ("age_as_entered", "age_as_entered"),
    ("age_fine", "age_fine"),
    ("age_semifine", "age_semifine"),
    ("age_coarse", "age_coarse"),
    ("HIV_treatment_status", "hiv_treatment_status"),
    ("Status HIV", "status_hiv"),
    ("Status TB", "status_tb"),
    ("Status CX", "status_cx"),
    ("category_option_combo_name", "category_option_combo_name"),
    ("source_name", "source_name"),
    ("Partner Type", "partner_type"),
    ("G2G", "g2g"),
    ("exclude due to known issue", "exclude_due_to_known_issue"),
];
