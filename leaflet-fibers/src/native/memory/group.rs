use super::slot_before;
use crate::event::{EventHandler, HandlerId, Listeners, MapEvent};
use crate::native::{LayerHost, NativeHandle, NativeObject, NativeResult};
use crate::props::{Options, PropValue};
use std::any::Any;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupType {
    LayerGroup,
    FeatureGroup,
}

/// Layer group / feature group. Children follow the group on and off the map.
#[derive(Debug)]
pub struct MemoryGroup {
    group_type: GroupType,
    options: Options,
    layers: Vec<NativeHandle>,
    listeners: Listeners,
    host: Option<LayerHost>,
    z_index: Option<f64>,
    style: Options,
}

impl MemoryGroup {
    pub(crate) fn new(group_type: GroupType, layers: &[NativeHandle], options: &Options) -> Self {
        Self {
            group_type,
            options: options.clone(),
            layers: layers.to_vec(),
            listeners: Listeners::new(),
            host: None,
            z_index: None,
            style: Options::new(),
        }
    }

    pub fn group_type(&self) -> GroupType {
        self.group_type
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn layers(&self) -> &[NativeHandle] {
        &self.layers
    }

    pub fn has_layer(&self, layer: &NativeHandle) -> bool {
        self.layers.iter().any(|l| l.ptr_eq(layer))
    }

    pub fn z_index(&self) -> Option<f64> {
        self.z_index
    }

    pub fn style(&self) -> &Options {
        &self.style
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.count(event)
    }

    pub fn fire(&self, event: &MapEvent) -> usize {
        self.listeners.fire(event)
    }
}

impl NativeObject for MemoryGroup {
    fn type_name(&self) -> &'static str {
        match self.group_type {
            GroupType::LayerGroup => "LayerGroup",
            GroupType::FeatureGroup => "FeatureGroup",
        }
    }

    fn on(&mut self, event: &str, handler: EventHandler) -> HandlerId {
        self.listeners.on(event, handler)
    }

    fn off(&mut self, event: &str, id: HandlerId) -> bool {
        self.listeners.off(event, id)
    }

    fn call_setter(&mut self, setter: &str, value: &PropValue) -> bool {
        match (setter, self.group_type) {
            ("setZIndex", _) => {
                self.z_index = value.as_f64();
                for layer in &self.layers {
                    layer.with_mut(|l| l.call_setter(setter, value));
                }
                true
            }
            ("setStyle", GroupType::FeatureGroup) => {
                if let Some(style) = value.as_options() {
                    self.style = style.over(&self.style);
                }
                for layer in &self.layers {
                    layer.with_mut(|l| l.call_setter(setter, value));
                }
                true
            }
            _ => false,
        }
    }

    fn add_layer(&mut self, layer: &NativeHandle) -> NativeResult<bool> {
        if self.has_layer(layer) {
            return Ok(true);
        }
        if let Some(host) = &self.host {
            layer.with_mut(|l| l.on_add(host))?;
        }
        self.layers.push(layer.clone());
        self.listeners.fire(&MapEvent::new("layeradd"));
        Ok(true)
    }

    fn insert_layer(&mut self, layer: &NativeHandle, before: &NativeHandle) -> NativeResult<bool> {
        let Some((slot, present)) = slot_before(&mut self.layers, layer, before) else {
            return Ok(false);
        };
        if !present {
            if let Some(host) = &self.host {
                layer.with_mut(|l| l.on_add(host))?;
            }
        }
        self.layers.insert(slot, layer.clone());
        if !present {
            self.listeners.fire(&MapEvent::new("layeradd"));
        }
        Ok(true)
    }

    fn remove_layer(&mut self, layer: &NativeHandle) -> bool {
        let Some(index) = self.layers.iter().position(|l| l.ptr_eq(layer)) else {
            return false;
        };
        let removed = self.layers.remove(index);
        if let Some(host) = &self.host {
            removed.with_mut(|l| l.on_remove(host));
        }
        self.listeners.fire(&MapEvent::new("layerremove"));
        true
    }

    fn on_add(&mut self, host: &LayerHost) -> NativeResult<()> {
        for layer in &self.layers {
            layer.with_mut(|l| l.on_add(host))?;
        }
        self.host = Some(host.clone());
        self.listeners.fire(&MapEvent::new("add"));
        Ok(())
    }

    fn on_remove(&mut self, host: &LayerHost) {
        for layer in &self.layers {
            layer.with_mut(|l| l.on_remove(host));
        }
        self.host = None;
        self.listeners.fire(&MapEvent::new("remove"));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
