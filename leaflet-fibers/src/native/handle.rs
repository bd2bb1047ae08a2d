use super::{NativeMap, NativeObject};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub type SharedNative = Rc<RefCell<dyn NativeObject>>;
pub type SharedMap = Rc<RefCell<dyn NativeMap>>;

/// Reference to a live native object.
///
/// Maps keep their `NativeMap` face so roots can be sized and registered;
/// everything else is a plain `NativeObject`.
#[derive(Clone)]
pub enum NativeHandle {
    Map(SharedMap),
    Object(SharedNative),
}

impl NativeHandle {
    pub fn object(object: impl NativeObject) -> Self {
        NativeHandle::Object(Rc::new(RefCell::new(object)))
    }

    pub fn map(map: impl NativeMap) -> Self {
        NativeHandle::Map(Rc::new(RefCell::new(map)))
    }

    pub fn as_map(&self) -> Option<&SharedMap> {
        match self {
            NativeHandle::Map(map) => Some(map),
            NativeHandle::Object(_) => None,
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&dyn NativeObject) -> R) -> R {
        match self {
            NativeHandle::Map(map) => f(map.borrow().as_object()),
            NativeHandle::Object(object) => f(&*object.borrow()),
        }
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut dyn NativeObject) -> R) -> R {
        match self {
            NativeHandle::Map(map) => {
                let mut guard = map.borrow_mut();
                f(guard.as_object_mut())
            }
            NativeHandle::Object(object) => f(&mut *object.borrow_mut()),
        }
    }

    /// Borrow the concrete native type, if it is `T`.
    pub fn downcast<T: 'static, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.with(|object| object.as_any().downcast_ref::<T>().map(f))
    }

    pub fn downcast_mut<T: 'static, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.with_mut(|object| object.as_any_mut().downcast_mut::<T>().map(f))
    }

    /// Identity comparison of the underlying allocation.
    pub fn ptr_eq(&self, other: &NativeHandle) -> bool {
        self.addr() == other.addr()
    }

    fn addr(&self) -> *const () {
        match self {
            NativeHandle::Map(map) => Rc::as_ptr(map) as *const (),
            NativeHandle::Object(object) => Rc::as_ptr(object) as *const (),
        }
    }
}

impl From<SharedMap> for NativeHandle {
    fn from(map: SharedMap) -> Self {
        NativeHandle::Map(map)
    }
}

impl From<SharedNative> for NativeHandle {
    fn from(object: SharedNative) -> Self {
        NativeHandle::Object(object)
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeHandle::Map(_) => write!(f, "NativeHandle::Map({:p})", self.addr()),
            NativeHandle::Object(_) => write!(f, "NativeHandle::Object({:p})", self.addr()),
        }
    }
}
