//! One shape placed by a structure template.
//!
//! An instruction moves through `Unloaded -> Loaded -> Ready -> Drawn`.
//! Loading resolves the shape type and material setter and parses every
//! position and size expression. Wiring a random source makes it ready.
//! Randomizing recalculates the values in a fixed order (position x, y, z,
//! then sizes in the shape's key order) and leaves the state alone. Drawing
//! rasterizes with the cached values only, so the same random sequence
//! always yields the same writes.

use std::collections::HashMap;
use std::rc::Rc;

use crate::config::ConfigNode;
use crate::core::error::{DrawError, LoadError};
use crate::core::types::IVec3;
use crate::iwgo::CoordinateTransform;
use crate::material::{MaterialRegistry, MaterialSetter, PickerRegistry};
use crate::shape::{Shape, ShapeRegistry, SizeMap};
use crate::value::{Environment, RandomAware, RandomSource, Value};
use crate::voxel::VoxelGrid;

const POSITION_KEYS: [&str; 3] = ["x", "y", "z"];

/// Lifecycle of an [`Instruction`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstructionState {
    Unloaded,
    Loaded,
    /// Random sources wired.
    Ready,
    Drawn,
}

/// Everything an instruction needs from its template while loading.
pub struct LoadContext<'a> {
    pub shapes: &'a ShapeRegistry,
    pub pickers: &'a PickerRegistry,
    pub materials: &'a dyn MaterialRegistry,
    /// Named setters declared by the template.
    pub setters: &'a HashMap<String, Rc<MaterialSetter>>,
    /// Variables the template declares.
    pub variables: &'a [String],
    pub random: &'a RandomSource,
}

impl LoadContext<'_> {
    fn is_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v == name)
    }

    /// Parse the scalar at `path` and check its variable references.
    fn value(&self, node: &ConfigNode<'_>, path: &str, field: &str) -> Result<Value, LoadError> {
        let source = node
            .string(path)
            .ok_or_else(|| LoadError::MissingKey(field.to_string()))?;
        let value = Value::parse(&source).map_err(|e| LoadError::value(field, e))?;
        value
            .check_bindings(|name| self.is_variable(name))
            .map_err(|e| LoadError::value(field, e))?;
        Ok(value)
    }
}

#[derive(Debug)]
pub struct Instruction {
    name: String,
    state: InstructionState,
    position: [Value; 3],
    shape: Option<Box<dyn Shape>>,
    setter: Option<Rc<MaterialSetter>>,
}

impl Instruction {
    /// Unloaded instruction.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: InstructionState::Unloaded,
            position: [Value::constant(0.0), Value::constant(0.0), Value::constant(0.0)],
            shape: None,
            setter: None,
        }
    }

    /// Build and load an instruction in one step.
    pub fn from_config(
        name: impl Into<String>,
        node: &ConfigNode<'_>,
        ctx: &LoadContext<'_>,
    ) -> Result<Self, LoadError> {
        let mut instruction = Self::new(name);
        instruction.load(node, ctx)?;
        Ok(instruction)
    }

    /// Instruction from parts that are already configured.
    pub fn with_parts(
        name: impl Into<String>,
        position: [Value; 3],
        shape: Box<dyn Shape>,
        setter: Rc<MaterialSetter>,
    ) -> Self {
        Self {
            name: name.into(),
            state: InstructionState::Loaded,
            position,
            shape: Some(shape),
            setter: Some(setter),
        }
    }

    /// Configure from a `{ "shape", "position"?, "size", "material" }` node.
    ///
    /// Leaves the instruction ready. On failure it stays unloaded and the
    /// error names it.
    pub fn load(&mut self, node: &ConfigNode<'_>, ctx: &LoadContext<'_>) -> Result<(), LoadError> {
        self.load_inner(node, ctx).map_err(|e| LoadError::Instruction {
            name: self.name.clone(),
            source: Box::new(e),
        })?;
        self.set_random_source(ctx.random);
        Ok(())
    }

    fn load_inner(&mut self, node: &ConfigNode<'_>, ctx: &LoadContext<'_>) -> Result<(), LoadError> {
        let kind = node
            .string("shape")
            .ok_or_else(|| LoadError::MissingKey("shape".into()))?;
        let mut shape = ctx
            .shapes
            .create(&kind)
            .ok_or_else(|| LoadError::UnknownShape(kind.clone()))?;

        // Position defaults to the template origin.
        let mut position = [Value::constant(0.0), Value::constant(0.0), Value::constant(0.0)];
        if let Some(pos) = node.get("position") {
            for (slot, key) in position.iter_mut().zip(POSITION_KEYS) {
                *slot = ctx.value(&pos, key, &format!("position.{key}"))?;
            }
        }

        let mut sizes = SizeMap::new();
        if let Some(size) = node.get("size") {
            for (key, _) in size.children() {
                let value = ctx.value(&size, &key, &format!("size.{key}"))?;
                sizes.insert(key, value);
            }
        }
        shape.set_size(sizes)?;

        let setter = match node.get("material") {
            None => return Err(LoadError::MissingKey("material".into())),
            Some(m) if m.is_object() => {
                let mut setter = MaterialSetter::load(&self.name, &m, ctx.pickers, ctx.materials)?;
                setter.set_random_source(ctx.random);
                Rc::new(setter)
            }
            Some(m) => {
                let name = m
                    .as_string()
                    .ok_or_else(|| LoadError::MissingKey("material".into()))?;
                ctx.setters
                    .get(&name)
                    .cloned()
                    .ok_or(LoadError::UnknownMaterialSetter(name))?
            }
        };

        self.position = position;
        self.shape = Some(shape);
        self.setter = Some(setter);
        self.state = InstructionState::Loaded;
        log::debug!("Loaded instruction '{}' ({})", self.name, kind);
        Ok(())
    }

    /// Drop the shape and setter.
    pub fn unload(&mut self) {
        self.shape = None;
        self.setter = None;
        self.state = InstructionState::Unloaded;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> InstructionState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state != InstructionState::Unloaded
    }

    pub fn shape(&self) -> Option<&dyn Shape> {
        self.shape.as_deref()
    }

    pub fn setter(&self) -> Option<&MaterialSetter> {
        self.setter.as_deref()
    }

    /// Cached position, truncated to whole voxels.
    pub fn origin(&self) -> IVec3 {
        let [x, y, z] = &self.position;
        IVec3::new(x.cached() as i32, y.cached() as i32, z.cached() as i32)
    }

    /// Recalculate position then sizes against `env`.
    ///
    /// Every value is computed before any cache is updated, so a failure
    /// leaves the previous position and sizes in place. The state is not
    /// changed.
    pub fn randomize(&mut self, env: &Environment) -> Result<(), DrawError> {
        let Some(shape) = self.shape.as_mut() else {
            return Err(DrawError::NotLoaded(self.name.clone()));
        };
        let results = self
            .position
            .iter()
            .chain(shape.sizes())
            .map(|v| v.evaluate(env))
            .collect::<Result<Vec<_>, _>>();
        let results = match results {
            Ok(results) => results,
            Err(e) => return Err(self.wrap(e.into())),
        };
        for (value, result) in self.position.iter_mut().chain(shape.sizes_mut()).zip(results) {
            value.set_cached(result);
        }
        Ok(())
    }

    /// Rasterize the shape at its cached position and write through the setter.
    pub fn draw(
        &mut self,
        transform: &dyn CoordinateTransform,
        grid: &mut dyn VoxelGrid,
    ) -> Result<(), DrawError> {
        let (Some(shape), Some(setter)) = (self.shape.as_ref(), self.setter.as_ref()) else {
            return Err(DrawError::NotLoaded(self.name.clone()));
        };
        let result = shape.rasterize(self.origin(), &mut |local, shell| {
            let world = transform.to_world(local).ok_or(DrawError::OutOfRange(local))?;
            setter.set_material(grid, world, shell).map_err(DrawError::from)
        });
        result.map_err(|e| self.wrap(e))?;
        self.state = InstructionState::Drawn;
        Ok(())
    }

    fn wrap(&self, source: DrawError) -> DrawError {
        DrawError::Instruction {
            name: self.name.clone(),
            source: Box::new(source),
        }
    }
}

impl RandomAware for Instruction {
    /// Rewires position and size values and moves a loaded instruction to
    /// `Ready`. Setters are wired when loaded.
    fn set_random_source(&mut self, source: &RandomSource) {
        for value in &mut self.position {
            value.set_random_source(source);
        }
        if let Some(shape) = self.shape.as_mut() {
            shape.set_random_source(source);
        }
        if self.state == InstructionState::Loaded {
            self.state = InstructionState::Ready;
        }
    }
}
