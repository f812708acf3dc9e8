use custom_error::custom_error;

custom_error! {
///! Custom error for request data that does not satisfy the domain rules.
pub MalformedInput
    InvalidName{message:String} = "{message}",
    InvalidEmail{message:String} = "{message}",
    InvalidListName{message:String} = "{message}",
    InvalidPassword{message:String} = "{message}",
    InvalidGender{message:String} = "{message}",
    InvalidRole{message:String} = "{message}",
}
