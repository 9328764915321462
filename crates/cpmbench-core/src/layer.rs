//! Behavior layers and their static composition.
//!
//! A [`Layer`] is middleware over the hook contract: each hook receives the
//! stack beneath it as `next` and forwards to it, possibly observing or
//! rewriting the call on the way. [`Stacked`] binds a layer over the node
//! beneath it, so a whole stack is a nest of `Stacked` ending in a
//! [`Machine`]. All dispatch is monomorphized.
//!
//! Pre-step handlers ([`Layer::on_step`]) receive the whole stack minus the
//! handler's own layer, entered at its outermost point. A syscall layer near
//! the bottom that reads memory is therefore still seen by every counter
//! stacked above it.

use crate::{Flag, Hooks, Machine, Reg16, Reg8, Report, StepFlow};

/// Stackable unit implementing any subset of the hook contract.
///
/// Every method has a forwarding default, so a layer only overrides the hooks
/// it instruments.
pub trait Layer {
    /// Intercepts an 8-bit register read.
    #[inline]
    fn get8<N: Hooks>(&mut self, next: &mut N, reg: Reg8) -> u8 {
        next.get8(reg)
    }

    /// Intercepts an 8-bit register write.
    #[inline]
    fn set8<N: Hooks>(&mut self, next: &mut N, reg: Reg8, value: u8) {
        next.set8(reg, value);
    }

    /// Intercepts a 16-bit register read.
    #[inline]
    fn get16<N: Hooks>(&mut self, next: &mut N, reg: Reg16) -> u16 {
        next.get16(reg)
    }

    /// Intercepts a 16-bit register write.
    #[inline]
    fn set16<N: Hooks>(&mut self, next: &mut N, reg: Reg16, value: u16) {
        next.set16(reg, value);
    }

    /// Intercepts a flag read.
    #[inline]
    fn flag<N: Hooks>(&mut self, next: &mut N, flag: Flag) -> bool {
        next.flag(flag)
    }

    /// Intercepts a flag write.
    #[inline]
    fn set_flag<N: Hooks>(&mut self, next: &mut N, flag: Flag, value: bool) {
        next.set_flag(flag, value);
    }

    /// Intercepts a memory read.
    #[inline]
    fn read<N: Hooks>(&mut self, next: &mut N, addr: u16) -> u8 {
        next.read(addr)
    }

    /// Intercepts a memory write.
    #[inline]
    fn write<N: Hooks>(&mut self, next: &mut N, addr: u16, value: u8) {
        next.write(addr, value);
    }

    /// Intercepts clock ticks.
    #[inline]
    fn tick<N: Hooks>(&mut self, next: &mut N, cycles: u32) {
        next.tick(cycles);
    }

    /// Runs before the engine executes an instruction.
    ///
    /// `stack` re-enters the composed stack from its outermost layer and skips
    /// only this layer. Returning [`StepFlow::Skip`] suppresses the engine step
    /// and every inner pre-step hook.
    #[inline]
    fn on_step<S: Hooks>(&mut self, stack: &mut S) -> StepFlow {
        let _ = stack;
        StepFlow::Execute
    }

    /// Appends this layer's counters to `report`.
    fn report(&self, report: &mut Report) {
        let _ = report;
    }
}

/// Layer that forwards every hook unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Passthrough;

impl Layer for Passthrough {}

/// A layer bound over the stack node beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stacked<L, N> {
    layer: L,
    next: N,
}

impl<L, N> Stacked<L, N> {
    /// Binds `layer` over `next`.
    #[must_use]
    pub const fn new(layer: L, next: N) -> Self {
        Self { layer, next }
    }

    /// Returns the outermost layer of this node.
    #[must_use]
    pub const fn layer(&self) -> &L {
        &self.layer
    }

    /// Returns the outermost layer of this node mutably.
    pub const fn layer_mut(&mut self) -> &mut L {
        &mut self.layer
    }

    /// Returns the stack beneath the outermost layer.
    #[must_use]
    pub const fn next(&self) -> &N {
        &self.next
    }

    /// Returns the stack beneath the outermost layer mutably.
    ///
    /// Hooks called on it bypass the outermost layer.
    pub const fn next_mut(&mut self) -> &mut N {
        &mut self.next
    }

    /// Splits this node into its layer and the stack beneath it.
    #[must_use]
    pub fn into_parts(self) -> (L, N) {
        (self.layer, self.next)
    }
}

impl<L: Layer, N: Hooks> Hooks for Stacked<L, N> {
    #[inline]
    fn get8(&mut self, reg: Reg8) -> u8 {
        self.layer.get8(&mut self.next, reg)
    }

    #[inline]
    fn set8(&mut self, reg: Reg8, value: u8) {
        self.layer.set8(&mut self.next, reg, value);
    }

    #[inline]
    fn get16(&mut self, reg: Reg16) -> u16 {
        self.layer.get16(&mut self.next, reg)
    }

    #[inline]
    fn set16(&mut self, reg: Reg16, value: u16) {
        self.layer.set16(&mut self.next, reg, value);
    }

    #[inline]
    fn flag(&mut self, flag: Flag) -> bool {
        self.layer.flag(&mut self.next, flag)
    }

    #[inline]
    fn set_flag(&mut self, flag: Flag, value: bool) {
        self.layer.set_flag(&mut self.next, flag, value);
    }

    #[inline]
    fn read(&mut self, addr: u16) -> u8 {
        self.layer.read(&mut self.next, addr)
    }

    #[inline]
    fn write(&mut self, addr: u16, value: u8) {
        self.layer.write(&mut self.next, addr, value);
    }

    #[inline]
    fn tick(&mut self, cycles: u32) {
        self.layer.tick(&mut self.next, cycles);
    }

    fn pre_step<A: Layer>(&mut self, above: &mut A) -> StepFlow {
        let flow = self
            .layer
            .on_step(&mut Chain::new(&mut *above, &mut self.next));
        if flow.is_skip() {
            return flow;
        }
        self.next
            .pre_step(&mut Above::new(above, &mut self.layer))
    }

    fn report(&self, report: &mut Report) {
        self.layer.report(report);
        self.next.report(report);
    }
}

/// Borrowed stack view: `layer` over `next`.
///
/// Handed to pre-step handlers so their hooks enter from the top.
pub struct Chain<'a, L, N> {
    layer: &'a mut L,
    next: &'a mut N,
}

impl<'a, L, N> Chain<'a, L, N> {
    /// Borrows `layer` over `next`.
    pub fn new(layer: &'a mut L, next: &'a mut N) -> Self {
        Self { layer, next }
    }
}

impl<L: Layer, N: Hooks> Hooks for Chain<'_, L, N> {
    #[inline]
    fn get8(&mut self, reg: Reg8) -> u8 {
        self.layer.get8(&mut *self.next, reg)
    }

    #[inline]
    fn set8(&mut self, reg: Reg8, value: u8) {
        self.layer.set8(&mut *self.next, reg, value);
    }

    #[inline]
    fn get16(&mut self, reg: Reg16) -> u16 {
        self.layer.get16(&mut *self.next, reg)
    }

    #[inline]
    fn set16(&mut self, reg: Reg16, value: u16) {
        self.layer.set16(&mut *self.next, reg, value);
    }

    #[inline]
    fn flag(&mut self, flag: Flag) -> bool {
        self.layer.flag(&mut *self.next, flag)
    }

    #[inline]
    fn set_flag(&mut self, flag: Flag, value: bool) {
        self.layer.set_flag(&mut *self.next, flag, value);
    }

    #[inline]
    fn read(&mut self, addr: u16) -> u8 {
        self.layer.read(&mut *self.next, addr)
    }

    #[inline]
    fn write(&mut self, addr: u16, value: u8) {
        self.layer.write(&mut *self.next, addr, value);
    }

    #[inline]
    fn tick(&mut self, cycles: u32) {
        self.layer.tick(&mut *self.next, cycles);
    }

    fn pre_step<A: Layer>(&mut self, above: &mut A) -> StepFlow {
        let flow = self
            .layer
            .on_step(&mut Chain::new(&mut *above, &mut *self.next));
        if flow.is_skip() {
            return flow;
        }
        self.next
            .pre_step(&mut Above::new(above, &mut *self.layer))
    }

    fn report(&self, report: &mut Report) {
        self.layer.report(report);
        self.next.report(report);
    }
}

/// Borrowed layer composition: `outer` wrapped around `inner`.
///
/// Accumulates the layers above a stack node while the pre-step chain
/// descends.
pub struct Above<'a, A, L> {
    outer: &'a mut A,
    inner: &'a mut L,
}

impl<'a, A, L> Above<'a, A, L> {
    /// Borrows `outer` wrapped around `inner`.
    pub fn new(outer: &'a mut A, inner: &'a mut L) -> Self {
        Self { outer, inner }
    }
}

impl<A: Layer, L: Layer> Layer for Above<'_, A, L> {
    #[inline]
    fn get8<N: Hooks>(&mut self, next: &mut N, reg: Reg8) -> u8 {
        self.outer.get8(&mut Chain::new(&mut *self.inner, next), reg)
    }

    #[inline]
    fn set8<N: Hooks>(&mut self, next: &mut N, reg: Reg8, value: u8) {
        self.outer
            .set8(&mut Chain::new(&mut *self.inner, next), reg, value);
    }

    #[inline]
    fn get16<N: Hooks>(&mut self, next: &mut N, reg: Reg16) -> u16 {
        self.outer.get16(&mut Chain::new(&mut *self.inner, next), reg)
    }

    #[inline]
    fn set16<N: Hooks>(&mut self, next: &mut N, reg: Reg16, value: u16) {
        self.outer
            .set16(&mut Chain::new(&mut *self.inner, next), reg, value);
    }

    #[inline]
    fn flag<N: Hooks>(&mut self, next: &mut N, flag: Flag) -> bool {
        self.outer.flag(&mut Chain::new(&mut *self.inner, next), flag)
    }

    #[inline]
    fn set_flag<N: Hooks>(&mut self, next: &mut N, flag: Flag, value: bool) {
        self.outer
            .set_flag(&mut Chain::new(&mut *self.inner, next), flag, value);
    }

    #[inline]
    fn read<N: Hooks>(&mut self, next: &mut N, addr: u16) -> u8 {
        self.outer.read(&mut Chain::new(&mut *self.inner, next), addr)
    }

    #[inline]
    fn write<N: Hooks>(&mut self, next: &mut N, addr: u16, value: u8) {
        self.outer
            .write(&mut Chain::new(&mut *self.inner, next), addr, value);
    }

    #[inline]
    fn tick<N: Hooks>(&mut self, next: &mut N, cycles: u32) {
        self.outer.tick(&mut Chain::new(&mut *self.inner, next), cycles);
    }

    fn report(&self, report: &mut Report) {
        self.outer.report(report);
        self.inner.report(report);
    }
}

/// A hook stack with a [`Machine`] at its base.
pub trait Stack: Hooks {
    /// Returns the base machine.
    fn machine(&self) -> &Machine;

    /// Returns the base machine mutably, bypassing every layer.
    fn machine_mut(&mut self) -> &mut Machine;

    /// Wraps `layer` around this stack as its new outermost layer.
    fn with<L: Layer>(self, layer: L) -> Stacked<L, Self>
    where
        Self: Sized,
    {
        Stacked::new(layer, self)
    }
}

impl Stack for Machine {
    fn machine(&self) -> &Machine {
        self
    }

    fn machine_mut(&mut self) -> &mut Machine {
        self
    }
}

impl<L: Layer, N: Stack> Stack for Stacked<L, N> {
    fn machine(&self) -> &Machine {
        self.next.machine()
    }

    fn machine_mut(&mut self) -> &mut Machine {
        self.next.machine_mut()
    }
}
