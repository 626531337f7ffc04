/// OSC message definition - the console never sends bundles to this client
use std::fmt;

use super::super::enums;
use super::types::Type;
use super::Buffer;

// MARK: Message
/// OSC single message
#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub struct Message {
    /// Address bit
    pub address: String,
    /// Arguments vector
    pub args: Vec<Type>,
}

// MARK: Message impl
impl Message {
    /// New message with no arguments
    #[must_use]
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_owned(),
            args: vec![],
        }
    }

    /// New message with a single integer argument
    #[must_use]
    pub fn new_with_int(address: &str, data: i32) -> Self {
        Self {
            address: address.to_owned(),
            args: vec![Type::Integer(data)],
        }
    }

    /// Get the first argument, with a sane default.
    /// Note that type is determined by the type of the default
    pub fn first_default<T>(&self, default: T) -> T where
        T: TryFrom<Type>
    {
        self.args.first()
            .and_then(|a| T::try_from(a.clone()).ok())
            .unwrap_or(default)
    }

    /// Boolean is message valid
    #[must_use]
    pub fn is_valid(&self) -> bool {
        if self.address.is_ascii() && !self.address.is_empty() {
            !self.args.iter().any(|s| matches!(s, Type::Unknown()))
        } else {
            false
        }
    }

    /// Add a known type to the message
    pub fn add_item<T>(&mut self, item: T) -> &mut Self where
        Type: std::convert::From<T>
    {
        self.args.push(Type::from(item));
        self
    }

    /// Get the type list as an `Type::TypeList`
    fn type_list(&self) -> Type {
        let list: Vec<char> = self.args
            .iter()
            .filter_map(|x| x.as_type_char().ok())
            .collect();

        list.into()
    }
}

// MARK: Message->String
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.address)?;
        for item in &self.args {
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

// MARK: Message->Buffer
impl TryFrom<Message> for Buffer {
    type Error = enums::Error;

    fn try_from(value: Message) -> Result<Self, Self::Error> {
        if !value.is_valid() { return Err(enums::Error::Packet(enums::PacketError::InvalidMessage)); }

        let mut osc_buffer = <Type as Into<Self>>::into(Type::String(value.address.clone()));

        if value.args.is_empty() {
            // a bare type list - "," padded to 4 bytes
            osc_buffer.extend(&Self::from(vec![0x2c, 0x0, 0x0, 0x0]));
        } else {
            osc_buffer.extend(&<Type as Into<Self>>::into(value.type_list()));
        }
        osc_buffer.extend(&value.args.into_iter().collect());

        Ok(osc_buffer)
    }
}

// MARK: Buffer->Message
impl TryFrom<Buffer> for Message {
    type Error = enums::Error;

    fn try_from(mut data: Buffer) -> Result<Self, Self::Error> {
        if !data.is_valid() {
            Err(enums::Error::Packet(enums::PacketError::NotFourByte))
        } else if let Ok(Type::String(osc_address)) = Type::try_from_buffer(data.next_string(), 's') {
            let mut osc_payload: Vec<Type> = vec![];

            if let Ok(Type::TypeList(osc_types)) = Type::try_from_buffer(data.next_string(), ',') {
                let type_input_length = osc_types.len();

                osc_payload = osc_types.into_iter().filter_map(|type_flag| match type_flag {
                    'i' | 'f' => Type::try_from_buffer(data.next_bytes(4), type_flag),
                    'h' | 'd' => Type::try_from_buffer(data.next_bytes(8), type_flag),
                    'T' | 'F' => Ok(Type::Boolean(type_flag == 'T')),
                    'N' => Ok(Type::Null()),
                    's' => Type::try_from_buffer(data.next_string(), 's'),
                    _ => Err(enums::Error::Osc(enums::OscError::UnknownType))
                }.ok()).collect();

                if osc_payload.len() != type_input_length {
                    return Err(enums::Error::Packet(enums::PacketError::InvalidTypesForMessage))
                }
            }

            Ok(Self {
                address: osc_address,
                args: osc_payload,
            })
        } else {
            Err(enums::Error::Packet(enums::PacketError::InvalidMessage))
        }
    }
}
