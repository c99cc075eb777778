//! Command line arguments and the run configuration built from them

use clap::{ArgAction, Parser};
use nearpoint_algorithms::Strategy;
use nearpoint_core::{Error, Point3f, Result};
use nearpoint_visualization::ShowFields;
use std::path::PathBuf;

pub const DEFAULT_BENCHMARK_FILE: &str = "whole_skull.vtk";
pub const DEFAULT_BENCHMARK_RUNS: usize = 10;

#[derive(Parser, Debug)]
#[command(
    name = "nearpoint",
    version,
    about = "Find the point on the scalp closest to a given query point."
)]
pub struct Cli {
    /// Path to the scalp mesh file (.vtk, .ply or .obj)
    #[arg(
        long = "scalp_fn",
        short = 's',
        value_name = "PATH",
        required_unless_present_any = ["benchmark", "demo"]
    )]
    pub scalp_fn: Option<PathBuf>,

    /// Query point coordinates
    #[arg(
        long = "query_point",
        short = 'q',
        num_args = 3,
        value_names = ["X", "Y", "Z"],
        allow_negative_numbers = true,
        required_unless_present_any = ["benchmark", "demo"]
    )]
    pub query_point: Option<Vec<f32>>,

    /// Method used to find the closest point: closest_point_pv, kd_tree_scipy or reference.
    /// Ignored in benchmark mode, which times every method
    #[arg(long = "method", short = 'm', default_value = "closest_point_pv")]
    pub method: String,

    /// Show the query coordinates (default)
    #[arg(long = "print_query_coord", overrides_with = "no_print_query_coord")]
    pub print_query_coord: bool,

    /// Hide the query coordinates
    #[arg(long = "no-print_query_coord", overrides_with = "print_query_coord")]
    pub no_print_query_coord: bool,

    /// Show the closest point coordinates (default)
    #[arg(long = "print_closest_coord", overrides_with = "no_print_closest_coord")]
    pub print_closest_coord: bool,

    /// Hide the closest point coordinates
    #[arg(long = "no-print_closest_coord", overrides_with = "print_closest_coord")]
    pub no_print_closest_coord: bool,

    /// Show the distance to the closest point (default)
    #[arg(long = "print_distance", overrides_with = "no_print_distance")]
    pub print_distance: bool,

    /// Hide the distance to the closest point
    #[arg(long = "no-print_distance", overrides_with = "print_distance")]
    pub no_print_distance: bool,

    /// Time every method on the benchmark file
    #[arg(long = "benchmark", short = 'b')]
    pub benchmark: bool,

    /// Number of timed runs per method in benchmark mode
    #[arg(long = "runs", default_value_t = DEFAULT_BENCHMARK_RUNS)]
    pub runs: usize,

    /// Mesh file used in benchmark mode
    #[arg(long = "benchmark_file", value_name = "PATH", default_value = DEFAULT_BENCHMARK_FILE)]
    pub benchmark_file: PathBuf,

    /// Run on a generated sphere with a predefined query point.
    /// The search uses --method, closest_point_pv unless another is given
    #[arg(long = "demo", short = 'd')]
    pub demo: bool,

    /// Also write the scene to this file as a colored PLY mesh
    #[arg(long = "export", value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

/// What the tool does in this invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Search a mesh file for the vertex closest to `query`
    Search { mesh_path: PathBuf, query: Point3f },
    /// Search the generated demo sphere
    Demo,
    /// Time every strategy on `mesh_path`
    Benchmark { mesh_path: PathBuf, runs: usize },
}

/// Immutable configuration for one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub mode: Mode,
    pub strategy: Strategy,
    pub show: ShowFields,
    pub export: Option<PathBuf>,
}

impl RunConfig {
    /// Validate the parsed arguments.
    ///
    /// Outside benchmark mode the method name is checked here, so an unknown
    /// method fails before any mesh is loaded or searched. Benchmark mode
    /// times every strategy and leaves `--method` unchecked. Benchmark takes
    /// precedence over demo, and demo over a normal search.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let strategy = if cli.benchmark {
            Strategy::default()
        } else {
            cli.method.parse()?
        };
        let show = ShowFields {
            query: !cli.no_print_query_coord,
            closest: !cli.no_print_closest_coord,
            distance: !cli.no_print_distance,
        };

        let mode = if cli.benchmark {
            if cli.runs == 0 {
                return Err(Error::InvalidData("--runs must be at least 1".to_string()));
            }
            Mode::Benchmark {
                mesh_path: cli.benchmark_file.clone(),
                runs: cli.runs,
            }
        } else if cli.demo {
            Mode::Demo
        } else {
            let mesh_path = cli
                .scalp_fn
                .clone()
                .ok_or_else(|| Error::InvalidData("--scalp_fn is required".to_string()))?;
            let query = match cli.query_point.as_deref() {
                Some(&[x, y, z]) => Point3f::new(x, y, z),
                _ => {
                    return Err(Error::InvalidQueryPoint(
                        "--query_point needs exactly three coordinates".to_string(),
                    ))
                }
            };
            Mode::Search { mesh_path, query }
        };

        Ok(Self {
            mode,
            strategy,
            show,
            export: cli.export.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("nearpoint").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_search_arguments() {
        let cli = parse(&["-s", "scalp.vtk", "-q", "-48.97", "11.73", "-56.77", "-m", "reference"]);
        let config = RunConfig::from_cli(&cli).unwrap();
        assert_eq!(
            config.mode,
            Mode::Search {
                mesh_path: PathBuf::from("scalp.vtk"),
                query: Point3f::new(-48.97, 11.73, -56.77),
            }
        );
        assert_eq!(config.strategy, Strategy::BruteForce);
        assert_eq!(config.show, ShowFields::all());
        assert!(config.export.is_none());
    }

    #[test]
    fn test_long_names() {
        let cli = parse(&[
            "--scalp_fn",
            "a.ply",
            "--query_point",
            "1",
            "2",
            "3",
            "--method",
            "kd_tree_scipy",
            "--export",
            "scene.ply",
        ]);
        let config = RunConfig::from_cli(&cli).unwrap();
        assert_eq!(config.strategy, Strategy::SpatialTree);
        assert_eq!(config.export, Some(PathBuf::from("scene.ply")));
    }

    #[test]
    fn test_default_method() {
        let cli = parse(&["-s", "a.vtk", "-q", "0", "0", "0"]);
        assert_eq!(RunConfig::from_cli(&cli).unwrap().strategy, Strategy::BuiltinLocator);
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let cli = parse(&["-s", "missing.vtk", "-q", "0", "0", "0", "-m", "bogus"]);
        let err = RunConfig::from_cli(&cli).unwrap_err();
        assert!(matches!(err, Error::UnsupportedStrategy(ref name) if name == "bogus"));
    }

    #[test]
    fn test_benchmark_ignores_method() {
        let cli = parse(&["-b", "-m", "bogus"]);
        let config = RunConfig::from_cli(&cli).unwrap();
        assert!(matches!(config.mode, Mode::Benchmark { .. }));
        assert_eq!(config.strategy, Strategy::default());

        // demo mode still checks it
        let cli = parse(&["-d", "-m", "bogus"]);
        assert!(matches!(
            RunConfig::from_cli(&cli),
            Err(Error::UnsupportedStrategy(_))
        ));
    }

    #[test]
    fn test_demo_honors_method() {
        let config = RunConfig::from_cli(&parse(&["-d", "-m", "reference"])).unwrap();
        assert_eq!(config.mode, Mode::Demo);
        assert_eq!(config.strategy, Strategy::BruteForce);
        let config = RunConfig::from_cli(&parse(&["-d"])).unwrap();
        assert_eq!(config.strategy, Strategy::BuiltinLocator);
    }

    #[test]
    fn test_show_toggles() {
        let cli = parse(&["-d", "--print_query_coord", "--no-print_distance"]);
        let show = RunConfig::from_cli(&cli).unwrap().show;
        assert_eq!(
            show,
            ShowFields {
                query: true,
                closest: true,
                distance: false,
            }
        );

        // the last toggle wins
        let cli = parse(&["-d", "--no-print_closest_coord", "--print_closest_coord"]);
        assert!(RunConfig::from_cli(&cli).unwrap().show.closest);
        let cli = parse(&["-d", "--print_query_coord", "--no-print_query_coord"]);
        assert!(!RunConfig::from_cli(&cli).unwrap().show.query);
    }

    #[test]
    fn test_mode_precedence() {
        let cli = parse(&["-b", "-d"]);
        assert_eq!(
            RunConfig::from_cli(&cli).unwrap().mode,
            Mode::Benchmark {
                mesh_path: PathBuf::from(DEFAULT_BENCHMARK_FILE),
                runs: DEFAULT_BENCHMARK_RUNS,
            }
        );
        let cli = parse(&["-d"]);
        assert_eq!(RunConfig::from_cli(&cli).unwrap().mode, Mode::Demo);

        let cli = parse(&["-b", "--runs", "3", "--benchmark_file", "head.ply"]);
        assert_eq!(
            RunConfig::from_cli(&cli).unwrap().mode,
            Mode::Benchmark {
                mesh_path: PathBuf::from("head.ply"),
                runs: 3,
            }
        );
        let cli = parse(&["-b", "--runs", "0"]);
        assert!(RunConfig::from_cli(&cli).is_err());
    }

    #[test]
    fn test_missing_or_malformed_arguments() {
        let attempt = |args: &[&str]| {
            Cli::try_parse_from(std::iter::once("nearpoint").chain(args.iter().copied()))
        };
        assert!(attempt(&[]).is_err());
        assert!(attempt(&["-s", "a.vtk"]).is_err());
        assert!(attempt(&["-q", "1", "2", "3"]).is_err());
        assert!(attempt(&["-s", "a.vtk", "-q", "1", "2"]).is_err());
        assert!(attempt(&["-s", "a.vtk", "-q", "1", "two", "3"]).is_err());
        assert!(attempt(&["-d", "--unknown"]).is_err());
    }

    #[test]
    fn test_verbosity_count() {
        assert_eq!(parse(&["-d"]).verbose, 0);
        assert_eq!(parse(&["-d", "-vv"]).verbose, 2);
    }

    #[test]
    fn test_command_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
