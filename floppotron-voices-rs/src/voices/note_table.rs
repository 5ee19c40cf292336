use super::Note;

/// Bend fraction bits: a fraction of `1 << 13` is one full semitone.
const FRACTION_BITS: u32 = 13;

/// PWM timing for one note.
///
/// The PWM counter runs at `system clock / clock_divider` and wraps every
/// `period` counts; each wrap toggles the drive's step line once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoteTiming {
    /// Integer clock divider (1..=255).
    pub clock_divider: u8,
    /// Wrap period for the unbent note.
    pub rest_period: u16,
    /// Wrap period one semitone up, at the same clock divider.
    pub pitch_up_period: u16,
}

impl NoteTiming {
    pub const fn new(clock_divider: u8, rest_period: u16, pitch_up_period: u16) -> Self {
        Self {
            clock_divider,
            rest_period,
            pitch_up_period,
        }
    }

    /// Look up the timing for `note`, or `None` if it is out of range.
    pub fn for_note(note: Note) -> Option<&'static NoteTiming> {
        NOTE_TABLE.get(usize::from(note))
    }

    /// Wrap period bent `fraction / 8192` of the way toward the next
    /// semitone up.
    pub fn period(&self, fraction: u16) -> u16 {
        let span = u32::from(self.rest_period - self.pitch_up_period);
        let fraction = u32::from(fraction) & ((1 << FRACTION_BITS) - 1);
        self.rest_period - ((span * fraction) >> FRACTION_BITS) as u16
    }
}

/// Per-note PWM timing for a 125 MHz system clock.
///
/// For note `n` the wrap frequency is `880 * 2^((n - 69) / 12)` Hz, twice
/// the pitch frequency, since two wraps make one step pulse. The divider is
/// the smallest integer that keeps the period within 16 bits.
#[rustfmt::skip]
pub const NOTE_TABLE: [NoteTiming; 128] = [
    NoteTiming::new(117, 65338, 61671),
    NoteTiming::new(111, 65004, 61356),
    NoteTiming::new(104, 65485, 61810),
    NoteTiming::new(99, 64932, 61287),
    NoteTiming::new(93, 65241, 61580),
    NoteTiming::new(88, 65079, 61426),
    NoteTiming::new(83, 65126, 61471),
    NoteTiming::new(78, 65412, 61740),
    NoteTiming::new(74, 65078, 61425),
    NoteTiming::new(70, 64935, 61291),
    NoteTiming::new(66, 65005, 61357),
    NoteTiming::new(62, 65315, 61649),
    NoteTiming::new(59, 64784, 61148),
    NoteTiming::new(56, 64424, 60808),
    NoteTiming::new(52, 65485, 61810),
    NoteTiming::new(50, 64282, 60675),
    NoteTiming::new(47, 64547, 60925),
    NoteTiming::new(44, 65079, 61426),
    NoteTiming::new(42, 64351, 60739),
    NoteTiming::new(39, 65412, 61740),
    NoteTiming::new(37, 65078, 61425),
    NoteTiming::new(35, 64935, 61291),
    NoteTiming::new(33, 65005, 61357),
    NoteTiming::new(31, 65315, 61649),
    NoteTiming::new(30, 63704, 60129),
    NoteTiming::new(28, 64424, 60808),
    NoteTiming::new(26, 65485, 61810),
    NoteTiming::new(25, 64282, 60675),
    NoteTiming::new(24, 63203, 59655),
    NoteTiming::new(22, 65079, 61426),
    NoteTiming::new(21, 64351, 60739),
    NoteTiming::new(20, 63776, 60197),
    NoteTiming::new(19, 63365, 59809),
    NoteTiming::new(18, 63131, 59588),
    NoteTiming::new(17, 63093, 59552),
    NoteTiming::new(16, 63274, 59723),
    NoteTiming::new(15, 63704, 60129),
    NoteTiming::new(14, 64424, 60808),
    NoteTiming::new(13, 65485, 61810),
    NoteTiming::new(13, 61810, 58341),
    NoteTiming::new(12, 63203, 59655),
    NoteTiming::new(11, 65079, 61426),
    NoteTiming::new(11, 61426, 57978),
    NoteTiming::new(10, 63776, 60197),
    NoteTiming::new(10, 60197, 56818),
    NoteTiming::new(9, 63131, 59588),
    NoteTiming::new(9, 59588, 56244),
    NoteTiming::new(8, 63274, 59723),
    NoteTiming::new(8, 59723, 56371),
    NoteTiming::new(7, 64424, 60808),
    NoteTiming::new(7, 60808, 57395),
    NoteTiming::new(7, 57395, 54174),
    NoteTiming::new(6, 63203, 59655),
    NoteTiming::new(6, 59655, 56307),
    NoteTiming::new(6, 56307, 53147),
    NoteTiming::new(5, 63776, 60197),
    NoteTiming::new(5, 60197, 56818),
    NoteTiming::new(5, 56818, 53629),
    NoteTiming::new(5, 53629, 50619),
    NoteTiming::new(4, 63274, 59723),
    NoteTiming::new(4, 59723, 56371),
    NoteTiming::new(4, 56371, 53207),
    NoteTiming::new(4, 53207, 50221),
    NoteTiming::new(4, 50221, 47402),
    NoteTiming::new(3, 63203, 59655),
    NoteTiming::new(3, 59655, 56307),
    NoteTiming::new(3, 56307, 53147),
    NoteTiming::new(3, 53147, 50164),
    NoteTiming::new(3, 50164, 47348),
    NoteTiming::new(3, 47348, 44691),
    NoteTiming::new(3, 44691, 42183),
    NoteTiming::new(2, 63274, 59723),
    NoteTiming::new(2, 59723, 56371),
    NoteTiming::new(2, 56371, 53207),
    NoteTiming::new(2, 53207, 50221),
    NoteTiming::new(2, 50221, 47402),
    NoteTiming::new(2, 47402, 44742),
    NoteTiming::new(2, 44742, 42230),
    NoteTiming::new(2, 42230, 39860),
    NoteTiming::new(2, 39860, 37623),
    NoteTiming::new(2, 37623, 35511),
    NoteTiming::new(2, 35511, 33518),
    NoteTiming::new(2, 33518, 31637),
    NoteTiming::new(1, 63274, 59723),
    NoteTiming::new(1, 59723, 56371),
    NoteTiming::new(1, 56371, 53207),
    NoteTiming::new(1, 53207, 50221),
    NoteTiming::new(1, 50221, 47402),
    NoteTiming::new(1, 47402, 44742),
    NoteTiming::new(1, 44742, 42230),
    NoteTiming::new(1, 42230, 39860),
    NoteTiming::new(1, 39860, 37623),
    NoteTiming::new(1, 37623, 35511),
    NoteTiming::new(1, 35511, 33518),
    NoteTiming::new(1, 33518, 31637),
    NoteTiming::new(1, 31637, 29861),
    NoteTiming::new(1, 29861, 28185),
    NoteTiming::new(1, 28185, 26603),
    NoteTiming::new(1, 26603, 25110),
    NoteTiming::new(1, 25110, 23701),
    NoteTiming::new(1, 23701, 22371),
    NoteTiming::new(1, 22371, 21115),
    NoteTiming::new(1, 21115, 19930),
    NoteTiming::new(1, 19930, 18811),
    NoteTiming::new(1, 18811, 17756),
    NoteTiming::new(1, 17756, 16759),
    NoteTiming::new(1, 16759, 15819),
    NoteTiming::new(1, 15819, 14931),
    NoteTiming::new(1, 14931, 14093),
    NoteTiming::new(1, 14093, 13302),
    NoteTiming::new(1, 13302, 12555),
    NoteTiming::new(1, 12555, 11850),
    NoteTiming::new(1, 11850, 11185),
    NoteTiming::new(1, 11185, 10558),
    NoteTiming::new(1, 10558, 9965),
    NoteTiming::new(1, 9965, 9406),
    NoteTiming::new(1, 9406, 8878),
    NoteTiming::new(1, 8878, 8380),
    NoteTiming::new(1, 8380, 7909),
    NoteTiming::new(1, 7909, 7465),
    NoteTiming::new(1, 7465, 7046),
    NoteTiming::new(1, 7046, 6651),
    NoteTiming::new(1, 6651, 6278),
    NoteTiming::new(1, 6278, 5925),
    NoteTiming::new(1, 5925, 5593),
    NoteTiming::new(1, 5593, 5279),
    NoteTiming::new(1, 5279, 4983),
    NoteTiming::new(1, 4983, 4703),
];
