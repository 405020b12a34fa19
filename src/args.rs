use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
pub struct Args {
    /// Initial width of the window
    #[arg(long, default_value_t = 800, value_parser = window_extent())]
    pub width: u32,
    /// Initial height of the window
    #[arg(long, default_value_t = 600, value_parser = window_extent())]
    pub height: u32,
    /// Window title
    #[arg(long, default_value = "StartAgain!")]
    pub title: String,
    /// Path to a GLSL vertex shader replacing the built-in one
    #[arg(long, requires = "fragment_shader")]
    pub vertex_shader: Option<PathBuf>,
    /// Path to a GLSL fragment shader replacing the built-in one
    #[arg(long, requires = "vertex_shader")]
    pub fragment_shader: Option<PathBuf>,
    /// Log filter in env_logger syntax, overrides RUST_LOG
    #[arg(long)]
    pub log: Option<String>,
}

/// Window sides must be non-zero and fit GL's signed sizes.
fn window_extent() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(1..=i32::MAX as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments() {
        let args = Args::try_parse_from(["quad"]).unwrap();

        assert_eq!(args.width, 800);
        assert_eq!(args.height, 600);
        assert_eq!(args.title, "StartAgain!");
        assert!(args.vertex_shader.is_none());
        assert!(args.fragment_shader.is_none());
        assert!(args.log.is_none());
    }

    #[test]
    fn shader_paths_come_in_pairs() {
        assert!(Args::try_parse_from(["quad", "--vertex-shader", "a.vert"]).is_err());

        let args = Args::try_parse_from([
            "quad",
            "--vertex-shader",
            "a.vert",
            "--fragment-shader",
            "b.frag",
        ])
        .unwrap();

        assert_eq!(args.vertex_shader, Some(PathBuf::from("a.vert")));
        assert_eq!(args.fragment_shader, Some(PathBuf::from("b.frag")));
    }

    #[test]
    fn window_size_must_fit_the_viewport() {
        assert!(Args::try_parse_from(["quad", "--width", "0"]).is_err());
        assert!(Args::try_parse_from(["quad", "--height", "0"]).is_err());
        assert!(Args::try_parse_from(["quad", "--width", "3000000000"]).is_err());
        assert!(Args::try_parse_from(["quad", "--height", "2147483648"]).is_err());

        let args =
            Args::try_parse_from(["quad", "--width", "2147483647", "--height", "1"]).unwrap();

        assert_eq!(args.width, 2147483647);
        assert_eq!(args.height, 1);
    }
}
