//! Depth profile scripts for driving a simulated dive.
//!
//! A profile is a list of steps separated by commas, semicolons or
//! whitespace. Each step yields one or more samples:
//!
//! - `18` - one sample at 18 m
//! - `18@9` - one sample at 18 m with an ascent rate of 9 m/min
//! - `1..10` - a ramp from 1 m to 10 m in 1 m increments
//! - `30..5:5@9` - a ramp from 30 m up to 5 m in 5 m increments, at 9 m/min
//!
//! # Example
//!
//! ```
//! use dive_session::profile::parse_profile;
//!
//! let steps = parse_profile("1..3, 12@9").expect("profile should parse");
//! let depths: Vec<f64> = steps.iter().map(|s| s.depth_m).collect();
//! assert_eq!(depths, vec![1.0, 2.0, 3.0, 12.0]);
//! assert_eq!(steps[3].ascent_rate, Some(9.0));
//! ```

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, multispace0, multispace1, one_of},
    combinator::{map_res, opt, recognize, value},
    multi::separated_list1,
    sequence::{delimited, preceded},
    IResult, Parser,
};

use crate::error::DiveError;

/// Upper bound on the number of samples a single profile may expand to.
pub const MAX_PROFILE_STEPS: usize = 100_000;

/// One sample of a depth profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileStep {
    pub depth_m: f64,
    /// Ascent rate (m/min) to apply with this sample; `None` keeps the driver default.
    pub ascent_rate: Option<f64>,
}

impl ProfileStep {
    pub fn at(depth_m: f64) -> Self {
        Self {
            depth_m,
            ascent_rate: None,
        }
    }

    pub fn with_rate(depth_m: f64, ascent_rate: f64) -> Self {
        Self {
            depth_m,
            ascent_rate: Some(ascent_rate),
        }
    }
}

/// Steady descent of 1 m per sample, from 1 m to `count` m, at a fixed ascent rate.
pub fn linear_descent(count: usize, ascent_rate: f64) -> Vec<ProfileStep> {
    (1..=count)
        .map(|i| ProfileStep::with_rate(i as f64, ascent_rate))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
enum RawStep {
    Single {
        depth: f64,
        rate: Option<f64>,
    },
    Ramp {
        from: f64,
        to: f64,
        increment: Option<f64>,
        rate: Option<f64>,
    },
}

/// Parse a profile script into its expanded list of samples.
pub fn parse_profile(input: &str) -> Result<Vec<ProfileStep>, DiveError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DiveError::EmptyProfile);
    }

    let raw = match separated_list1(parse_separator, parse_step).parse(input) {
        Ok((remaining, raw)) => {
            let remaining = remaining.trim();
            if !remaining.is_empty() {
                return Err(DiveError::ProfileParse {
                    position: input.len() - remaining.len(),
                    message: format!("unexpected characters: '{}'", remaining),
                });
            }
            raw
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(DiveError::ProfileParse {
                position: input.len() - e.input.len(),
                message: format!("expected a depth, found '{}'", e.input),
            });
        }
        Err(nom::Err::Incomplete(_)) => {
            return Err(DiveError::ProfileParse {
                position: input.len(),
                message: "incomplete input".to_string(),
            });
        }
    };

    let mut steps = Vec::new();
    for step in raw {
        expand(step, &mut steps)?;
    }
    Ok(steps)
}

fn expand(step: RawStep, out: &mut Vec<ProfileStep>) -> Result<(), DiveError> {
    match step {
        RawStep::Single { depth, rate } => {
            push_step(out, ProfileStep {
                depth_m: depth,
                ascent_rate: rate,
            })?;
        }
        RawStep::Ramp {
            from,
            to,
            increment,
            rate,
        } => {
            let increment = increment.unwrap_or(1.0);
            if increment <= 0.0 || !increment.is_finite() {
                return Err(DiveError::InvalidRampStep(increment));
            }
            let direction = if to >= from { 1.0 } else { -1.0 };
            let count = ((to - from).abs() / increment + 1e-9).floor();
            if count >= MAX_PROFILE_STEPS as f64 {
                return Err(too_long());
            }
            for k in 0..=(count as usize) {
                push_step(out, ProfileStep {
                    depth_m: from + direction * increment * k as f64,
                    ascent_rate: rate,
                })?;
            }
        }
    }
    Ok(())
}

fn push_step(out: &mut Vec<ProfileStep>, step: ProfileStep) -> Result<(), DiveError> {
    if out.len() >= MAX_PROFILE_STEPS {
        return Err(too_long());
    }
    out.push(step);
    Ok(())
}

fn too_long() -> DiveError {
    DiveError::ProfileParse {
        position: 0,
        message: format!("profile expands to more than {MAX_PROFILE_STEPS} samples"),
    }
}

fn parse_separator(input: &str) -> IResult<&str, ()> {
    alt((
        value((), delimited(multispace0, one_of(",;"), multispace0)),
        value((), multispace1),
    ))
    .parse(input)
}

fn parse_step(input: &str) -> IResult<&str, RawStep> {
    let (input, from) = parse_number(input)?;
    let (input, ramp) = opt((
        preceded(tag(".."), parse_number),
        opt(preceded(char(':'), parse_number)),
    ))
    .parse(input)?;
    let (input, rate) = opt(preceded(char('@'), parse_number)).parse(input)?;

    let step = match ramp {
        Some((to, increment)) => RawStep::Ramp {
            from,
            to,
            increment,
            rate,
        },
        None => RawStep::Single { depth: from, rate },
    };
    Ok((input, step))
}

/// Decimal number without exponent, so that `1..10` splits at the range dots.
fn parse_number(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize((opt(one_of("+-")), digit1, opt((char('.'), digit1)))),
        |s: &str| s.parse::<f64>(),
    )
    .parse(input)
}
