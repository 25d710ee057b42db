//! Stimulus Contract host types exposed to component scripts.
//!
//! A component artifact is a script whose constructor assembles an instance
//! from these registered types: typed ports (a power port carries a paired
//! effort/flow state, a signal port a single value), logged-output accessors,
//! and a discrete-time step closure. All handles are shared so script
//! closures and the harness observe the same underlying state.
//!
//! Connection rules: a port connects only to a port of the same kind, and
//! reading through an unconnected port is a script runtime error naming the
//! port.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use rhai::{Dynamic, Engine, EvalAltResult, FnPtr, AST};

/// Port carrying a paired (effort, flow) numeric state.
#[derive(Clone)]
pub struct PowerPort {
    inner: Rc<RefCell<PowerPortState>>,
}

#[derive(Default)]
struct PowerPortState {
    name: String,
    effort: f64,
    flow: f64,
    // Back-reference makes the pair an Rc cycle; validation is per-process
    // and short-lived, so the ports live until the child exits anyway.
    connected: Option<PowerPort>,
}

impl PowerPort {
    pub fn new(name: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PowerPortState {
                name: name.to_string(),
                ..PowerPortState::default()
            })),
        }
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn write_effort(&mut self, value: f64) {
        self.inner.borrow_mut().effort = value;
    }

    pub fn write_flow(&mut self, value: f64) {
        self.inner.borrow_mut().flow = value;
    }

    /// Read the connected peer's effort.
    pub fn read_effort(&self) -> Result<f64, String> {
        let peer = self.inner.borrow().connected.clone();
        match peer {
            Some(p) => Ok(p.inner.borrow().effort),
            None => Err(format!("[{}] Read error: port not connected.", self.name())),
        }
    }

    /// Read the connected peer's flow.
    pub fn read_flow(&self) -> Result<f64, String> {
        let peer = self.inner.borrow().connected.clone();
        match peer {
            Some(p) => Ok(p.inner.borrow().flow),
            None => Err(format!("[{}] Read error: port not connected.", self.name())),
        }
    }

    /// Link this end to `other`. Symmetric connection is established by
    /// [`connect_power`], which attaches both ends exactly once per pair.
    pub fn attach(&self, other: &PowerPort) {
        self.inner.borrow_mut().connected = Some(other.clone());
    }
}

/// Port carrying a single numeric signal.
#[derive(Clone)]
pub struct SignalPort {
    inner: Rc<RefCell<SignalPortState>>,
}

#[derive(Default)]
struct SignalPortState {
    name: String,
    signal: f64,
    connected: Option<SignalPort>,
}

impl SignalPort {
    pub fn new(name: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SignalPortState {
                name: name.to_string(),
                ..SignalPortState::default()
            })),
        }
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn write_signal(&mut self, value: f64) {
        self.inner.borrow_mut().signal = value;
    }

    /// Read the connected peer's signal.
    pub fn read_signal(&self) -> Result<f64, String> {
        let peer = self.inner.borrow().connected.clone();
        match peer {
            Some(p) => Ok(p.inner.borrow().signal),
            None => Err(format!("[{}] Read error: port not connected.", self.name())),
        }
    }

    pub fn attach(&self, other: &SignalPort) {
        self.inner.borrow_mut().connected = Some(other.clone());
    }
}

/// Establish the symmetric power connection: both ends reference each other.
pub fn connect_power(a: &PowerPort, b: &PowerPort) {
    a.attach(b);
    b.attach(a);
}

/// Establish the symmetric signal connection.
pub fn connect_signal(a: &SignalPort, b: &SignalPort) {
    a.attach(b);
    b.attach(a);
}

/// A port of either kind, as enumerated from a component.
#[derive(Clone)]
pub enum Port {
    Power(PowerPort),
    Signal(SignalPort),
}

impl Port {
    pub fn name(&self) -> String {
        match self {
            Port::Power(p) => p.name(),
            Port::Signal(s) => s.name(),
        }
    }
}

/// The base contract instance a script constructor populates and returns.
#[derive(Clone)]
pub struct Component {
    inner: Rc<RefCell<ComponentState>>,
}

#[derive(Default)]
struct ComponentState {
    name: String,
    ports: Vec<Port>,
    logged: IndexMap<String, FnPtr>,
    outputs: IndexMap<String, SignalPort>,
    step_fn: Option<FnPtr>,
}

impl Component {
    pub fn new(name: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ComponentState {
                name: name.to_string(),
                ..ComponentState::default()
            })),
        }
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn add_power_port(&mut self, port: PowerPort) {
        self.inner.borrow_mut().ports.push(Port::Power(port));
    }

    pub fn add_signal_port(&mut self, port: SignalPort) {
        self.inner.borrow_mut().ports.push(Port::Signal(port));
    }

    /// Register a zero-argument accessor under `"<component>_<name>"` and
    /// auto-create the matching output signal port.
    pub fn add_logged(&mut self, name: &str, accessor: FnPtr) {
        let qualified = format!("{}_{}", self.name(), name);
        let output = SignalPort::new(&qualified);
        let mut state = self.inner.borrow_mut();
        state.logged.insert(qualified.clone(), accessor);
        state.ports.push(Port::Signal(output.clone()));
        state.outputs.insert(qualified, output);
    }

    pub fn on_step(&mut self, step_fn: FnPtr) {
        self.inner.borrow_mut().step_fn = Some(step_fn);
    }

    pub fn ports(&self) -> Vec<Port> {
        self.inner.borrow().ports.clone()
    }

    pub fn port_count(&self) -> usize {
        self.inner.borrow().ports.len()
    }

    pub fn logged_count(&self) -> usize {
        self.inner.borrow().logged.len()
    }

    /// Invoke the discrete-time advance operation with step size `dt`.
    pub fn step(&self, engine: &Engine, ast: &AST, dt: f64) -> Result<(), Box<EvalAltResult>> {
        let step_fn = self.inner.borrow().step_fn.clone();
        match step_fn {
            Some(f) => f.call::<Dynamic>(engine, ast, (dt,)).map(|_| ()),
            None => Err(format!(
                "[{}] component does not implement a step function.",
                self.name()
            )
            .into()),
        }
    }

    /// Refresh output ports: evaluate every logged accessor, write numeric
    /// values through to the auto-created signal ports, and return the
    /// evaluated `(name, value)` pairs in registration order.
    pub fn refresh_outputs(
        &self,
        engine: &Engine,
        ast: &AST,
    ) -> Result<Vec<(String, Dynamic)>, Box<EvalAltResult>> {
        let logged: Vec<(String, FnPtr)> = {
            let state = self.inner.borrow();
            state
                .logged
                .iter()
                .map(|(name, f)| (name.clone(), f.clone()))
                .collect()
        };

        let mut values = Vec::with_capacity(logged.len());
        for (name, accessor) in logged {
            // Flatten: a closure returning a captured variable yields a
            // shared value.
            let value = accessor.call::<Dynamic>(engine, ast, ())?.flatten();
            if let Some(v) = numeric_value(&value) {
                let output = self.inner.borrow().outputs.get(&name).cloned();
                if let Some(mut port) = output {
                    port.write_signal(v);
                }
            }
            values.push((name, value));
        }
        Ok(values)
    }
}

/// Extract a numeric value from a script value, widening ints to floats.
#[allow(clippy::cast_precision_loss)]
pub fn numeric_value(value: &Dynamic) -> Option<f64> {
    if let Ok(f) = value.as_float() {
        Some(f)
    } else if let Ok(i) = value.as_int() {
        Some(i as f64)
    } else {
        None
    }
}

/// Build a fresh engine with the contract types registered and resource
/// ceilings applied. One engine per validation call: a fresh namespace,
/// nothing carried over between artifacts.
pub fn engine(max_operations: u64) -> Engine {
    let mut engine = Engine::new();
    if max_operations > 0 {
        engine.set_max_operations(max_operations);
    }
    // Pin the expression-depth ceiling to rhai's non-debug defaults so the
    // same artifacts validate identically under both build profiles; rhai's
    // own defaults are tighter (16) under `debug_assertions`, which would
    // otherwise reject well-formed constructors only in debug builds.
    engine.set_max_expr_depths(64, 32);

    engine
        .register_type_with_name::<PowerPort>("PowerPort")
        .register_fn("power_port", PowerPort::new)
        .register_fn("write_effort", PowerPort::write_effort)
        .register_fn("write_flow", PowerPort::write_flow)
        .register_fn(
            "read_effort",
            |p: &mut PowerPort| -> Result<f64, Box<EvalAltResult>> {
                p.read_effort().map_err(Into::into)
            },
        )
        .register_fn(
            "read_flow",
            |p: &mut PowerPort| -> Result<f64, Box<EvalAltResult>> {
                p.read_flow().map_err(Into::into)
            },
        )
        .register_fn("connect_port", |p: &mut PowerPort, other: PowerPort| {
            p.attach(&other);
        })
        .register_fn(
            "connect_port",
            |p: &mut PowerPort, _other: SignalPort| -> Result<(), Box<EvalAltResult>> {
                Err(format!("[{}] can only connect to another PowerPort.", p.name()).into())
            },
        );

    engine
        .register_type_with_name::<SignalPort>("SignalPort")
        .register_fn("signal_port", SignalPort::new)
        .register_fn("write_signal", SignalPort::write_signal)
        .register_fn(
            "read_signal",
            |p: &mut SignalPort| -> Result<f64, Box<EvalAltResult>> {
                p.read_signal().map_err(Into::into)
            },
        )
        .register_fn("connect_port", |p: &mut SignalPort, other: SignalPort| {
            p.attach(&other);
        })
        .register_fn(
            "connect_port",
            |p: &mut SignalPort, _other: PowerPort| -> Result<(), Box<EvalAltResult>> {
                Err(format!("[{}] can only connect to another SignalPort.", p.name()).into())
            },
        );

    engine
        .register_type_with_name::<Component>("Component")
        .register_fn("component", Component::new)
        .register_fn("add_port", |c: &mut Component, port: PowerPort| {
            c.add_power_port(port);
        })
        .register_fn("add_port", |c: &mut Component, port: SignalPort| {
            c.add_signal_port(port);
        })
        .register_fn("add_logged", |c: &mut Component, name: &str, f: FnPtr| {
            c.add_logged(name, f);
        })
        .register_fn("on_step", |c: &mut Component, f: FnPtr| {
            c.on_step(f);
        });

    engine
}
