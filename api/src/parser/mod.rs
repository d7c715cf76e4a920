//! Scene File Parser

use scale_core::fileutil::*;
use scale_core::geometry::*;
use scale_core::group::*;
use scale_core::pnr::*;
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extension of scene description files.
pub const SCENE_EXTENSION: &str = "scene";

/// The `pest` parser generated from a grammar.
#[derive(Parser)]
#[grammar = "parser/grammar.pest"]
struct SceneParser;

/// Errors reading a scene description.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file could not be read.
    #[error("cannot read scene file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file does not follow the grammar.
    #[error("syntax error in {}: {message}", path.display())]
    Syntax { path: PathBuf, message: String },

    /// The file is well formed but a value is unusable.
    #[error("invalid scene {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

/// Groups read from scene files.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Millimeters per scene unit.
    pub mm_per_unit: Float,

    /// Groups in file order.
    pub groups: Vec<ObjectGroup>,
}

/// Reads and parses a scene file.
///
/// * `path` - Path to the scene file.
pub fn parse(path: &Path) -> Result<Scene, ParseError> {
    if !has_extension(path, SCENE_EXTENSION) {
        warn!(
            "'{}' does not have a .{SCENE_EXTENSION} extension",
            path.display()
        );
    }

    let contents = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let scene = parse_str(&contents, path)?;
    debug!(
        "Parsed {} group(s) from '{}'",
        scene.groups.len(),
        path.display()
    );
    Ok(scene)
}

/// Parses several scene files and returns all their groups in order. Each
/// file keeps its own unit scale.
///
/// * `paths` - Paths to the scene files.
pub fn parse_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ObjectGroup>, ParseError> {
    let mut groups = vec![];
    for path in paths {
        groups.extend(parse(path.as_ref())?.groups);
    }
    Ok(groups)
}

/// Parses scene description text.
///
/// * `contents` - The scene description.
/// * `path`     - Path reported in errors.
pub fn parse_str(contents: &str, path: &Path) -> Result<Scene, ParseError> {
    SceneFileParser { path }.parse(contents)
}

/// Walks the token pairs of one scene file.
struct SceneFileParser<'a> {
    /// Path to the file being parsed.
    path: &'a Path,
}

impl<'a> SceneFileParser<'a> {
    fn parse(&self, contents: &str) -> Result<Scene, ParseError> {
        let scene = SceneParser::parse(Rule::scene, contents)
            .map_err(|err| ParseError::Syntax {
                path: self.path.to_path_buf(),
                message: err.to_string(),
            })?
            .next()
            .ok_or_else(|| self.invalid("empty scene"))?;

        let mut mm_per_unit: Option<Float> = None;
        let mut groups = vec![];

        for pair in scene.into_inner() {
            match pair.as_rule() {
                Rule::units_stmt => {
                    let [units] = self.numbers::<1>(pair)?;
                    if !(units > 0.0 && units.is_finite()) {
                        return Err(self.invalid(format!("Units must be positive, got {units}")));
                    }
                    if mm_per_unit.is_some() {
                        warn!("'{}' sets Units more than once", self.path.display());
                    }
                    mm_per_unit = Some(units);
                }
                Rule::group_stmt => groups.push(self.parse_group(pair)?),
                Rule::EOI => (), // Done
                _ => unreachable!(),
            }
        }

        // Units apply to the whole file wherever they are declared.
        let mm_per_unit = mm_per_unit.unwrap_or(1.0);
        for group in groups.iter_mut() {
            group.mm_per_unit = mm_per_unit;
        }

        Ok(Scene {
            mm_per_unit,
            groups,
        })
    }

    /// Parse a `group_stmt`. Transformations accumulate like a current
    /// transformation matrix and apply to the meshes that follow them.
    fn parse_group(&self, pair: Pair<Rule>) -> Result<ObjectGroup, ParseError> {
        let mut inner = pair.into_inner();
        let name = self.quoted_str(&mut inner)?;
        let mut group = ObjectGroup::new(&name);

        let mut ctm = Transform::default();
        let mut pushed: Vec<Transform> = vec![];

        for entry in inner {
            match entry.as_rule() {
                Rule::mesh_stmt => {
                    let mut pairs = entry.into_inner();
                    let mesh = self.quoted_str(&mut pairs)?;
                    let p0 = self.point(&mut pairs)?;
                    let p1 = self.point(&mut pairs)?;
                    group.meshes.push(MeshInstance::new(&mesh, bounds3(p0, p1), ctm));
                }
                Rule::light_stmt => {
                    let light = self.quoted_str(&mut entry.into_inner())?;
                    group.lights.push(light);
                }
                Rule::attribute_begin_stmt => pushed.push(ctm),
                Rule::attribute_end_stmt => {
                    ctm = pushed.pop().ok_or_else(|| {
                        self.invalid(format!("unmatched AttributeEnd in group '{name}'"))
                    })?;
                }
                Rule::identity_stmt => ctm = Transform::default(),
                Rule::translate_stmt => {
                    let [x, y, z] = self.numbers::<3>(entry)?;
                    ctm = ctm * translate(&vector3(x, y, z));
                }
                Rule::scale_stmt => {
                    let [x, y, z] = self.numbers::<3>(entry)?;
                    ctm = ctm * scale(x, y, z);
                }
                Rule::rotate_stmt => {
                    let [angle, x, y, z] = self.numbers::<4>(entry)?;
                    let axis = vector3(x, y, z);
                    if axis.length_squared() == 0.0 {
                        return Err(self.invalid(format!(
                            "zero rotation axis in group '{name}'"
                        )));
                    }
                    ctm = ctm * rotate_axis(angle, &axis);
                }
                _ => unreachable!(),
            }
        }

        if !pushed.is_empty() {
            warn!("Group '{name}' has unclosed AttributeBegin");
        }
        Ok(group)
    }

    /// Returns the contents of the next `quoted_str`.
    fn quoted_str(&self, pairs: &mut Pairs<Rule>) -> Result<String, ParseError> {
        pairs
            .next()
            .and_then(|p| p.into_inner().next())
            .map(|p| String::from(p.as_str()))
            .ok_or_else(|| self.invalid("expected a quoted string"))
    }

    /// Returns the next `point`.
    fn point(&self, pairs: &mut Pairs<Rule>) -> Result<Point3f, ParseError> {
        let pair = pairs
            .next()
            .ok_or_else(|| self.invalid("expected a point"))?;
        let [x, y, z] = self.numbers::<3>(pair)?;
        Ok(point3(x, y, z))
    }

    /// Returns the `N` numbers inside a rule.
    fn numbers<const N: usize>(&self, pair: Pair<Rule>) -> Result<[Float; N], ParseError> {
        let values = pair
            .into_inner()
            .map(|p| {
                p.as_str()
                    .parse::<Float>()
                    .map_err(|err| self.invalid(format!("bad number '{}'. {err}", p.as_str())))
            })
            .collect::<Result<Vec<Float>, ParseError>>()?;
        let n = values.len();
        values
            .try_into()
            .map_err(|_| self.invalid(format!("expected {N} numbers, got {n}")))
    }

    fn invalid(&self, message: impl Into<String>) -> ParseError {
        ParseError::Invalid {
            path: self.path.to_path_buf(),
            message: message.into(),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
