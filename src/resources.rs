//! The roms the chip can run.
use std::io::{self, Read};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Represents a single rom with it's information
pub struct Rom {
    /// The rom name
    name: String,
    /// The raw program stored as a u8 slice on the heap, it's copied into
    /// memory as is.
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data
    pub fn new(name: &str, data: &[u8]) -> Self {
        Rom {
            name: name.to_string(),
            data: data.into(),
        }
    }

    /// Will read the full rom from the given reader, for example a file.
    ///
    /// # Example
    /// ```rust
    /// # use chip::resources::Rom;
    /// let rom = Rom::from_reader("PONG", &[0x00u8, 0xE0][..]).unwrap();
    /// assert_eq!(rom.get_data(), &[0x00, 0xE0]);
    /// ```
    pub fn from_reader<R: Read>(name: &str, mut reader: R) -> io::Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        log::debug!("read rom '{}' with {} bytes", name, data.len());

        Ok(Rom {
            name: name.to_string(),
            data: data.into_boxed_slice(),
        })
    }

    /// Will return a slice internal values of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
