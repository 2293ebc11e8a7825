//! Recording mock backend shared by the integration tests.
//!
//! Every call and every handle release is appended to a shared journal so
//! tests can assert on ordering. Enqueue runs the square kernel on the host.

#![allow(dead_code)]

use cl_squares::{ComputeBackend, ComputeError, DeviceClass, Resource, Result, Stage};
use std::cell::RefCell;
use std::rc::Rc;

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Call(&'static str),
    Release(&'static str),
}

pub type Journal = Rc<RefCell<Vec<Event>>>;

/// Step at which the mock should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Platforms,
    Devices,
    Context,
    Queue,
    Program,
    Build,
    Kernel,
    Buffer,
    SetArg,
    Enqueue,
    Flush,
    Finish,
    Readback,
}

#[derive(Debug, Clone)]
pub struct MockDevice {
    pub name: String,
    pub class: DeviceClass,
    /// `None` makes the availability query fail.
    pub available: Option<bool>,
}

impl MockDevice {
    pub fn gpu(name: &str, available: bool) -> Self {
        Self {
            name: name.to_owned(),
            class: DeviceClass::Gpu,
            available: Some(available),
        }
    }

    pub fn cpu(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            class: DeviceClass::Cpu,
            available: Some(true),
        }
    }

    pub fn broken_query(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            class: DeviceClass::Gpu,
            available: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MockPlatform {
    pub name: String,
    pub devices: Vec<MockDevice>,
}

/// A handle that records its own release.
#[derive(Debug)]
pub struct Handle {
    label: &'static str,
    journal: Journal,
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.journal.borrow_mut().push(Event::Release(self.label));
    }
}

#[derive(Debug)]
pub struct MockBuffer {
    _handle: Handle,
    data: Rc<RefCell<Vec<f32>>>,
}

#[derive(Debug)]
pub struct MockKernel {
    _handle: Handle,
    arg: RefCell<Option<Rc<RefCell<Vec<f32>>>>>,
}

/// Value written into the corrupted slot instead of its square.
pub const CORRUPT_VALUE: f32 = -1.0;

pub struct MockBackend {
    pub platforms: Vec<MockPlatform>,
    pub fail_at: Option<FailAt>,
    pub build_log: String,
    /// Slot the simulated kernel writes [`CORRUPT_VALUE`] into.
    pub corrupt_slot: Option<usize>,
    pub journal: Journal,
}

impl MockBackend {
    pub fn new(platforms: Vec<MockPlatform>) -> Self {
        Self {
            platforms,
            fail_at: None,
            build_log: String::new(),
            corrupt_slot: None,
            journal: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// One platform with one available GPU.
    pub fn with_gpu() -> Self {
        Self::new(vec![MockPlatform {
            name: "Mock Platform".into(),
            devices: vec![MockDevice::gpu("Mock GPU", true)],
        }])
    }

    pub fn failing_at(mut self, step: FailAt) -> Self {
        self.fail_at = Some(step);
        self
    }

    pub fn corrupting_slot(mut self, slot: usize) -> Self {
        self.corrupt_slot = Some(slot);
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.journal.borrow().clone()
    }

    pub fn releases(&self) -> Vec<&'static str> {
        self.journal
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Release(label) => Some(*label),
                _ => None,
            })
            .collect()
    }

    pub fn called(&self, name: &str) -> bool {
        self.journal
            .borrow()
            .iter()
            .any(|e| matches!(e, Event::Call(c) if *c == name))
    }

    fn call(&self, name: &'static str, step: FailAt) -> Result<()> {
        self.journal.borrow_mut().push(Event::Call(name));
        if self.fail_at == Some(step) {
            return Err(injected(step));
        }
        Ok(())
    }

    fn handle(&self, label: &'static str) -> Handle {
        Handle {
            label,
            journal: Rc::clone(&self.journal),
        }
    }
}

fn injected(step: FailAt) -> ComputeError {
    let reason = format!("injected failure at {step:?}");
    match step {
        FailAt::Platforms | FailAt::Devices => ComputeError::Enumeration { reason },
        FailAt::Context => ComputeError::resource(Resource::Context, reason),
        FailAt::Queue => ComputeError::resource(Resource::CommandQueue, reason),
        FailAt::Program => ComputeError::resource(Resource::Program, reason),
        FailAt::Kernel => ComputeError::resource(Resource::Kernel, reason),
        FailAt::Buffer => ComputeError::resource(Resource::Buffer, reason),
        FailAt::Build => ComputeError::Build {
            reason,
            log: String::new(),
        },
        FailAt::SetArg => ComputeError::runtime(Stage::SetArg, reason),
        FailAt::Enqueue => ComputeError::runtime(Stage::Enqueue, reason),
        FailAt::Flush => ComputeError::runtime(Stage::Flush, reason),
        FailAt::Finish => ComputeError::runtime(Stage::Finish, reason),
        FailAt::Readback => ComputeError::runtime(Stage::Readback, reason),
    }
}

impl ComputeBackend for MockBackend {
    type Platform = MockPlatform;
    type Device = MockDevice;
    type Context = Handle;
    type Queue = Handle;
    type Program = Handle;
    type Kernel = MockKernel;
    type Buffer = MockBuffer;

    fn name(&self) -> &'static str {
        "mock"
    }

    fn platforms(&self) -> Result<Vec<MockPlatform>> {
        self.call("platforms", FailAt::Platforms)?;
        Ok(self.platforms.clone())
    }

    fn platform_name(&self, platform: &MockPlatform) -> String {
        platform.name.clone()
    }

    fn devices(&self, platform: &MockPlatform, class: DeviceClass) -> Result<Vec<MockDevice>> {
        self.call("devices", FailAt::Devices)?;
        Ok(platform
            .devices
            .iter()
            .filter(|d| class == DeviceClass::All || d.class == class)
            .cloned()
            .collect())
    }

    fn device_name(&self, device: &MockDevice) -> String {
        device.name.clone()
    }

    fn is_available(&self, device: &MockDevice) -> Result<bool> {
        device.available.ok_or_else(|| ComputeError::Enumeration {
            reason: "CL_INVALID_DEVICE".into(),
        })
    }

    fn create_context(&self, _device: &MockDevice) -> Result<Handle> {
        self.call("create_context", FailAt::Context)?;
        Ok(self.handle("context"))
    }

    fn create_queue(&self, _context: &Handle, _device: &MockDevice) -> Result<Handle> {
        self.call("create_queue", FailAt::Queue)?;
        Ok(self.handle("queue"))
    }

    fn create_program(&self, _context: &Handle, _source: &str) -> Result<Handle> {
        self.call("create_program", FailAt::Program)?;
        Ok(self.handle("program"))
    }

    fn build_program(&self, _program: &mut Handle, _device: &MockDevice) -> Result<()> {
        self.journal.borrow_mut().push(Event::Call("build_program"));
        if self.fail_at == Some(FailAt::Build) {
            return Err(ComputeError::Build {
                reason: "CL_BUILD_PROGRAM_FAILURE".into(),
                log: self.build_log.clone(),
            });
        }
        Ok(())
    }

    fn create_kernel(&self, _program: &Handle, _name: &str) -> Result<MockKernel> {
        self.call("create_kernel", FailAt::Kernel)?;
        Ok(MockKernel {
            _handle: self.handle("kernel"),
            arg: RefCell::new(None),
        })
    }

    fn create_output_buffer(&self, _context: &Handle, len: usize) -> Result<MockBuffer> {
        self.call("create_output_buffer", FailAt::Buffer)?;
        Ok(MockBuffer {
            _handle: self.handle("buffer"),
            data: Rc::new(RefCell::new(vec![f32::NAN; len])),
        })
    }

    fn set_buffer_arg(&self, kernel: &MockKernel, index: u32, buffer: &MockBuffer) -> Result<()> {
        self.call("set_buffer_arg", FailAt::SetArg)?;
        assert_eq!(index, 0, "the kernel has a single argument");
        *kernel.arg.borrow_mut() = Some(Rc::clone(&buffer.data));
        Ok(())
    }

    fn enqueue_1d(&self, _queue: &Handle, kernel: &MockKernel, global_size: usize) -> Result<()> {
        self.call("enqueue_1d", FailAt::Enqueue)?;
        let arg = kernel.arg.borrow();
        let mut out = arg
            .as_ref()
            .expect("argument bound before enqueue")
            .borrow_mut();
        for (i, slot) in out.iter_mut().take(global_size).enumerate() {
            *slot = if self.corrupt_slot == Some(i) {
                CORRUPT_VALUE
            } else {
                (i * i) as f32
            };
        }
        Ok(())
    }

    fn flush(&self, _queue: &Handle) -> Result<()> {
        self.call("flush", FailAt::Flush)
    }

    fn finish(&self, _queue: &Handle) -> Result<()> {
        self.call("finish", FailAt::Finish)
    }

    fn read_buffer(&self, _queue: &Handle, buffer: &MockBuffer, dst: &mut [f32]) -> Result<()> {
        self.call("read_buffer", FailAt::Readback)?;
        dst.copy_from_slice(&buffer.data.borrow()[..dst.len()]);
        Ok(())
    }
}
