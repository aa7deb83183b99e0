use crate::SUPPLY_MV;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeDiv {
    Ms10,
    Ms1,
}

impl TimeDiv {
    pub fn ms(self) -> u32 {
        match self {
            TimeDiv::Ms10 => 10,
            TimeDiv::Ms1 => 1,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            TimeDiv::Ms10 => TimeDiv::Ms1,
            TimeDiv::Ms1 => TimeDiv::Ms10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VoltDiv {
    Mv500,
    Mv100,
}

impl VoltDiv {
    pub fn mv(self) -> u32 {
        match self {
            VoltDiv::Mv500 => 500,
            VoltDiv::Mv100 => 100,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            VoltDiv::Mv500 => VoltDiv::Mv100,
            VoltDiv::Mv100 => VoltDiv::Mv500,
        }
    }
}

/// Horizontal and vertical scale of the scope traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScopeView {
    pub time_div: TimeDiv,
    pub volt_div: VoltDiv,
}

impl ScopeView {
    pub const DEFAULT: ScopeView = ScopeView {
        time_div: TimeDiv::Ms10,
        volt_div: VoltDiv::Mv500,
    };

    /// Samples shown at the current time division.
    pub fn visible<'a>(&self, samples: &'a [u16]) -> &'a [u16] {
        let zoom = (TimeDiv::Ms10.ms() / self.time_div.ms()) as usize;
        &samples[..samples.len() / zoom]
    }

    /// Zooms a millivolt sample around mid supply.
    pub fn scale(&self, mv: u16) -> u16 {
        let zoom = (VoltDiv::Mv500.mv() / self.volt_div.mv()) as i32;
        let mid = (SUPPLY_MV / 2) as i32;
        let scaled = (mv as i32 - mid) * zoom + mid;
        scaled.max(0).min(SUPPLY_MV as i32) as u16
    }

    /// Scaled sample as a pixel row counted up from the bottom, in
    /// `0..height`.
    pub fn to_screen(&self, mv: u16, height: u16) -> u16 {
        if height == 0 {
            return 0;
        }
        let scaled = self.scale(mv) as u32;
        (scaled * (height as u32 - 1) / SUPPLY_MV) as u16
    }
}

impl Default for ScopeView {
    fn default() -> Self {
        ScopeView::DEFAULT
    }
}
