pub const CONFIG_PATH_VAR: &str = "GEOPREP_CONFIG";
pub const INPUT_DIR_VAR: &str = "DATA_FROM_BROWSER_DIR";
pub const OUTPUT_DIR_VAR: &str = "OUTPUT_DIR";
pub const GEOSERVER_URL_VAR: &str = "GEOSERVER_URL";
pub const INITIAL_LAT_VAR: &str = "INITIAL_LAT";
pub const INITIAL_LON_VAR: &str = "INITIAL_LON";
pub const PORT_VAR: &str = "GEOPREP_PORT";
pub const PUBLIC_DIR_VAR: &str = "GEOPREP_PUBLIC_DIR";
pub const LOG_DIR_VAR: &str = "GEOPREP_LOG_DIR";
pub const GHOSTSCRIPT_VAR: &str = "GEOPREP_GS";
pub const PS2PDF_VAR: &str = "GEOPREP_PS2PDF";
pub const ENSCRIPT_VAR: &str = "GEOPREP_ENSCRIPT";
pub const TOOL_TIMEOUT_VAR: &str = "GEOPREP_TOOL_TIMEOUT_SECS";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PUBLIC_DIR: &str = "public";
pub const DEFAULT_LOG_DIR: &str = "logs";
