//! Argument parsing and output formatting for the `rotconv` binary.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use nalgebra::Matrix3;

use crate::geometry::rotation::{
    EulerAngles, Quaternion, RotationConverter, RotationMatrix, euler_to_quaternion,
};

pub const USAGE: &str = "\
Usage: rotconv [--config <file.yaml>] <command> <values...>

Commands:
  quat-to-rpy     x y z w        quaternion to roll pitch yaw (rad)
  quat-to-matrix  x y z w        quaternion to 3x3 rotation matrix
  matrix-to-quat  m00 .. m22     row-major matrix to quaternion x y z w
  matrix-to-rpy   m00 .. m22     row-major matrix to roll pitch yaw (rad)
  rpy-to-quat     roll pitch yaw quaternion x y z w from angles (rad)";

/// One conversion requested on the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    QuatToRpy(Quaternion),
    QuatToMatrix(Quaternion),
    MatrixToQuat(RotationMatrix),
    MatrixToRpy(RotationMatrix),
    RpyToQuat(EulerAngles),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub config_path: Option<PathBuf>,
    pub command: Command,
}

/// Parse arguments, excluding the program name.
pub fn parse_args<I>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().peekable();
    let mut config_path = None;

    if args.peek().map(String::as_str) == Some("--config") {
        args.next();
        let path = args.next().context("--config requires a file path")?;
        config_path = Some(PathBuf::from(path));
    }

    let name = args.next().context("Missing command")?;
    let values = args
        .map(|a| {
            a.parse::<f64>()
                .with_context(|| format!("Failed to parse {:?} as a number", a))
        })
        .collect::<Result<Vec<f64>>>()?;

    let command = match name.as_str() {
        "quat-to-rpy" => Command::QuatToRpy(quaternion_from(&values)?),
        "quat-to-matrix" => Command::QuatToMatrix(quaternion_from(&values)?),
        "matrix-to-quat" => Command::MatrixToQuat(matrix_from(&values)?),
        "matrix-to-rpy" => Command::MatrixToRpy(matrix_from(&values)?),
        "rpy-to-quat" => {
            let [roll, pitch, yaw] = expect_len::<3>(&values, "roll pitch yaw")?;
            Command::RpyToQuat(EulerAngles::new(roll, pitch, yaw))
        }
        other => bail!("Unknown command {:?}", other),
    };

    Ok(Invocation {
        config_path,
        command,
    })
}

impl Command {
    /// Run the conversion and format the result as whitespace-separated numbers.
    pub fn run(&self, converter: &RotationConverter) -> Result<String> {
        let out = match self {
            Command::QuatToRpy(q) => format_euler(&converter.quaternion_to_euler(*q)?),
            Command::QuatToMatrix(q) => format_matrix(&converter.quaternion_to_matrix(*q)?),
            Command::MatrixToQuat(m) => format_quaternion(&converter.matrix_to_quaternion(m)?),
            Command::MatrixToRpy(m) => format_euler(&converter.matrix_to_euler(m)?),
            Command::RpyToQuat(angles) => format_quaternion(&euler_to_quaternion(*angles)),
        };
        Ok(out)
    }
}

fn expect_len<const N: usize>(values: &[f64], what: &str) -> Result<[f64; N]> {
    match <[f64; N]>::try_from(values) {
        Ok(arr) => Ok(arr),
        Err(_) => bail!("Expected {} values ({}), got {}", N, what, values.len()),
    }
}

fn quaternion_from(values: &[f64]) -> Result<Quaternion> {
    Ok(Quaternion::from(expect_len::<4>(values, "x y z w")?))
}

fn matrix_from(values: &[f64]) -> Result<RotationMatrix> {
    let data = expect_len::<9>(values, "row-major 3x3")?;
    Ok(Matrix3::from_row_slice(&data))
}

fn format_quaternion(q: &Quaternion) -> String {
    format!("{:.12} {:.12} {:.12} {:.12}", q.x, q.y, q.z, q.w)
}

fn format_euler(e: &EulerAngles) -> String {
    format!("{:.12} {:.12} {:.12}", e.roll, e.pitch, e.yaw)
}

fn format_matrix(m: &RotationMatrix) -> String {
    m.row_iter()
        .map(|row| format!("{:.12} {:.12} {:.12}", row[0], row[1], row[2]))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_quaternion_command() {
        let inv = parse_args(args("quat-to-rpy 0 0 0 1")).unwrap();
        assert_eq!(inv.config_path, None);
        assert_eq!(inv.command, Command::QuatToRpy(Quaternion::IDENTITY));
    }

    #[test]
    fn test_parse_config_flag() {
        let inv = parse_args(args("--config calib.yaml rpy-to-quat 0 0 0")).unwrap();
        assert_eq!(inv.config_path, Some(PathBuf::from("calib.yaml")));
        assert_eq!(inv.command, Command::RpyToQuat(EulerAngles::ZERO));
    }

    #[test]
    fn test_parse_matrix_is_row_major() {
        let inv = parse_args(args("matrix-to-rpy 0 -1 0 1 0 0 0 0 1")).unwrap();
        let Command::MatrixToRpy(m) = inv.command else {
            panic!("wrong command");
        };
        assert_eq!(m[(0, 1)], -1.0);
        assert_eq!(m[(1, 0)], 1.0);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(args("")).is_err());
        assert!(parse_args(args("--config")).is_err());
        assert!(parse_args(args("quat-to-rpy 0 0 1")).is_err());
        assert!(parse_args(args("quat-to-rpy 0 0 x 1")).is_err());
        assert!(parse_args(args("spin 0 0 0 1")).is_err());
    }

    #[test]
    fn test_run_identity_matrix() {
        let inv = parse_args(args("quat-to-matrix 0 0 0 1")).unwrap();
        let out = inv.command.run(&RotationConverter::default()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "1.000000000000 0.000000000000 0.000000000000");
    }

    #[test]
    fn test_run_reports_invalid_input() {
        let inv = parse_args(args("quat-to-rpy 1 1 0 0")).unwrap();
        let err = inv.command.run(&RotationConverter::default()).unwrap_err();
        assert!(err.to_string().contains("invalid quaternion"));
    }
}
