use clap::Parser;
use std::path::PathBuf;

/// Mock or extend a GraphQL API with synthetic data
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "fakeql", version, about, long_about = None)]
pub struct Cli {
    /// SDL file to serve, or to extend the upstream schema with when `--extend` is given
    #[arg(env = "FAKEQL_SCHEMA_FILE")]
    pub file: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(short, long, env = "FAKEQL_CONFIG", default_value = "fakeql.toml")]
    pub config: PathBuf,

    /// Server port
    #[arg(short, long, env = "FAKEQL_PORT")]
    pub port: Option<u16>,

    /// Server host address
    #[arg(long, env = "FAKEQL_HOST")]
    pub host: Option<String>,

    /// URL of the GraphQL server to extend
    #[arg(short, long, env = "FAKEQL_EXTEND")]
    pub extend: Option<String>,

    /// Header sent to the extended server, as "Name: value"
    #[arg(short = 'H', long = "header", requires = "extend")]
    pub headers: Vec<String>,

    /// Inbound header copied onto forwarded requests
    #[arg(long = "forward-headers", requires = "extend")]
    pub forward_headers: Vec<String>,

    /// Allowed CORS origin
    #[arg(long, env = "FAKEQL_CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Let extension fields replace upstream fields of the same name without `@override`
    #[arg(long)]
    pub override_fields: bool,

    /// Default locale of the fake generators
    #[arg(long, env = "FAKEQL_LOCALE")]
    pub locale: Option<String>,
}
